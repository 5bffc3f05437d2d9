// stayflow/src/core/control.rs

//! Signals a hook returns to the engine, and the outcome of a full run.

/// Returned by every hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Run the next hook, then the next step.
  Proceed,
  /// End the run here without an error. Used for outcomes such as the guest
  /// closing the checkout widget.
  Halt,
}

/// How a run ended when no hook returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
  Completed,
  Halted,
}
