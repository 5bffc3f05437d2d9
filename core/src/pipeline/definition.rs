// stayflow/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` struct and its construction.

use crate::core::context::Handler;
use crate::core::step::StepDef;
use crate::error::{PipelineError, PipelineResult};
use std::collections::{HashMap, HashSet};

/// An ordered list of named steps, each carrying `before`, `on` and `after`
/// hooks that operate on a shared `ContextData<TData>`.
///
/// `Err` is what hooks fail with; engine failures are converted into it
/// through `From<PipelineError>`.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,

  pub(crate) before: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Creates a pipeline over the given steps, in order. Step names must be unique.
  pub fn new(steps: Vec<StepDef<TData>>) -> PipelineResult<Self> {
    let mut seen = HashSet::new();
    for step in &steps {
      if !seen.insert(step.name.as_str()) {
        return Err(PipelineError::DuplicateStep {
          step_name: step.name.clone(),
        });
      }
    }

    Ok(Self {
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    })
  }

  pub fn step_names(&self) -> impl Iterator<Item = &str> {
    self.steps.iter().map(|s| s.name.as_str())
  }

  pub(crate) fn ensure_step_exists(&self, step_name: &str) -> PipelineResult<()> {
    if self.steps.iter().any(|s| s.name == step_name) {
      Ok(())
    } else {
      Err(PipelineError::StepNotFound {
        step_name: step_name.to_string(),
      })
    }
  }
}
