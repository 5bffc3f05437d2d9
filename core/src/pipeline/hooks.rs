// stayflow/src/pipeline/hooks.rs

//! Registration of `before`, `on` and `after` hooks.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::StepControl;
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::definition::Pipeline;
use std::collections::HashMap;
use std::future::Future;
use tracing::{event, Level};

#[derive(Debug, Clone, Copy)]
enum Phase {
  Before,
  On,
  After,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Registers a hook that runs ahead of the step's `on` hooks.
  ///
  /// The hook may fail with any error convertible into the pipeline's `Err`.
  pub fn before<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> PipelineResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.register(Phase::Before, step_name, handler_fn)
  }

  /// Registers the main hook(s) of a step.
  pub fn on<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> PipelineResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.register(Phase::On, step_name, handler_fn)
  }

  /// Registers a hook that runs once the step's `on` hooks all proceeded.
  pub fn after<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> PipelineResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.register(Phase::After, step_name, handler_fn)
  }

  fn register<F, HandlerErr>(
    &mut self,
    phase: Phase,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> PipelineResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name)?;
    let boxed: Handler<TData, Err> = Box::new(move |ctx_data| {
      let fut = handler_fn(ctx_data);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });

    let table: &mut HashMap<String, Vec<Handler<TData, Err>>> = match phase {
      Phase::Before => &mut self.before,
      Phase::On => &mut self.on,
      Phase::After => &mut self.after,
    };
    table.entry(step_name.to_string()).or_default().push(boxed);
    event!(Level::TRACE, step = step_name, phase = ?phase, "Hook registered.");
    Ok(self)
  }
}
