// stayflow/src/error.rs

//! Errors raised by the step-pipeline engine itself, as opposed to the
//! errors produced by step handlers.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Step already defined: {step_name}")]
  DuplicateStep { step_name: String },

  #[error("Handler missing for required step: {step_name}")]
  HandlerMissing { step_name: String },
}

pub type PipelineResult<T, E = PipelineError> = std::result::Result<T, E>;
