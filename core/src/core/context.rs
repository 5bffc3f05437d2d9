// stayflow/src/core/context.rs

//! The `Handler<TData, Err>` type stored for every registered step hook.

use crate::core::context_data::ContextData;
use crate::core::control::StepControl;
use std::future::Future;
use std::pin::Pin;

/// A boxed, type-erased step hook.
///
/// A handler receives its own clone of the attempt's `ContextData<TData>` and
/// resolves to a `StepControl` or the pipeline's error type.
///
/// Handlers lock the context to copy out what they need, release the guard,
/// and only then `.await` on network calls. A guard held across an `.await`
/// blocks every other hook touching the same attempt.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>> + Send + Sync,
>;
