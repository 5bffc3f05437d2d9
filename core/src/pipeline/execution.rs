// stayflow/src/pipeline/execution.rs

//! `Pipeline::run()`: walks the steps in order and drives their hooks.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{PipelineOutcome, StepControl};
use crate::error::PipelineError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, info_span, instrument, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Runs every step against `ctx_data`.
  ///
  /// The first hook returning `StepControl::Halt` ends the run with
  /// `PipelineOutcome::Halted`; the first hook error is returned as-is.
  /// A required step without any hook fails with
  /// `PipelineError::HandlerMissing`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineOutcome, Err> {
    event!(Level::DEBUG, "Pipeline run starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = info_span!("pipeline_step", step_name, step_index = step_idx);

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(&ctx_data) {
          event!(parent: &step_span, Level::INFO, "Step skipped by its skip condition.");
          continue;
        }
      }

      let phases = [
        ("before", self.before.get(step_name)),
        ("on", self.on.get(step_name)),
        ("after", self.after.get(step_name)),
      ];
      let has_hooks = phases.iter().any(|(_, hooks)| hooks.is_some_and(|v| !v.is_empty()));
      if !has_hooks {
        if step_def.optional {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no hooks, skipping.");
          continue;
        }
        event!(parent: &step_span, Level::ERROR, "Required step has no hooks.");
        return Err(Err::from(PipelineError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      for (phase, hooks) in phases {
        let Some(hooks) = hooks else { continue };
        let control = run_phase(hooks, &ctx_data, phase)
          .instrument(step_span.clone())
          .await?;
        if control == StepControl::Halt {
          event!(parent: &step_span, Level::INFO, phase, "Pipeline halted by a hook.");
          return Ok(PipelineOutcome::Halted);
        }
      }
      event!(parent: &step_span, Level::DEBUG, "Step finished.");
    }

    event!(Level::DEBUG, "Pipeline run completed.");
    Ok(PipelineOutcome::Completed)
  }
}

async fn run_phase<TData, Err>(
  hooks: &[Handler<TData, Err>],
  ctx_data: &ContextData<TData>,
  phase: &'static str,
) -> Result<StepControl, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  for (hook_idx, hook) in hooks.iter().enumerate() {
    match hook(ctx_data.clone()).await {
      Ok(StepControl::Proceed) => {}
      Ok(StepControl::Halt) => return Ok(StepControl::Halt),
      Err(e) => {
        event!(Level::ERROR, phase, hook_index = hook_idx, error = %e, "Hook failed.");
        return Err(e);
      }
    }
  }
  Ok(StepControl::Proceed)
}
