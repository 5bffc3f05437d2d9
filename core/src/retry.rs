// stayflow/src/retry.rs

//! Capped exponential-backoff retry around a single endpoint call, with a
//! per-attempt timeout and user-initiated abort.

use crate::services::error::ApiError;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
  /// Total attempts, the first one included.
  pub max_attempts: u32,
  /// Wait after the first failed attempt.
  pub initial_delay: Duration,
  pub multiplier: f64,
  pub max_delay: Duration,
  /// Each attempt is dropped (and its request cancelled) after this long.
  pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      initial_delay: Duration::from_secs(2),
      multiplier: 2.0,
      max_delay: Duration::from_secs(30),
      attempt_timeout: Duration::from_secs(30),
    }
  }
}

impl RetryPolicy {
  /// A single attempt with the same timeout.
  pub fn no_retry(&self) -> Self {
    Self {
      max_attempts: 1,
      ..self.clone()
    }
  }

  /// Delay before attempt `attempt + 1`, where `attempt` is 1-based.
  pub fn delay_after(&self, attempt: u32) -> Duration {
    let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
    Duration::from_secs_f64((self.initial_delay.as_secs_f64() * factor).min(self.max_delay.as_secs_f64()))
  }
}

/// Cancellation handle shared between the flow and its in-flight calls.
///
/// Once aborted it stays aborted; a new booking attempt gets a new signal.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
  inner: Arc<AbortInner>,
}

#[derive(Debug, Default)]
struct AbortInner {
  aborted: AtomicBool,
  notify: Notify,
}

impl AbortSignal {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn abort(&self) {
    self.inner.aborted.store(true, Ordering::SeqCst);
    self.inner.notify.notify_waiters();
  }

  pub fn is_aborted(&self) -> bool {
    self.inner.aborted.load(Ordering::SeqCst)
  }

  /// Resolves once `abort` has been called.
  pub async fn aborted(&self) {
    loop {
      let notified = self.inner.notify.notified();
      if self.is_aborted() {
        return;
      }
      notified.await;
    }
  }

  /// Runs `fut` unless the signal fires first.
  pub async fn guard<T>(&self, fut: impl Future<Output = T>) -> Result<T, ApiError> {
    tokio::select! {
      biased;
      _ = self.aborted() => Err(ApiError::Aborted),
      value = fut => Ok(value),
    }
  }
}

/// Calls `operation` until it succeeds, fails with a non-retryable error, or
/// `policy.max_attempts` is reached. The last error is returned.
pub async fn retry_with_backoff<F, Fut, T>(
  policy: &RetryPolicy,
  operation_name: &str,
  abort: &AbortSignal,
  mut operation: F,
) -> Result<T, ApiError>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, ApiError>>,
{
  let max_attempts = policy.max_attempts.max(1);

  for attempt in 1..=max_attempts {
    let outcome = abort
      .guard(tokio::time::timeout(policy.attempt_timeout, operation()))
      .await
      .and_then(|timed| timed.unwrap_or(Err(ApiError::Timeout(policy.attempt_timeout))));

    let err = match outcome {
      Ok(value) => {
        if attempt > 1 {
          info!(operation = operation_name, attempt, "Succeeded after retry.");
        }
        return Ok(value);
      }
      Err(err) => err,
    };

    if attempt == max_attempts || !err.is_retryable() {
      warn!(
        operation = operation_name,
        attempt,
        max_attempts,
        error = %err,
        "Giving up."
      );
      return Err(err);
    }

    let delay = policy.delay_after(attempt);
    warn!(
      operation = operation_name,
      attempt,
      max_attempts,
      error = %err,
      retry_in_ms = delay.as_millis() as u64,
      "Transient failure, retrying."
    );
    abort.guard(tokio::time::sleep(delay)).await?;
  }

  // max_attempts >= 1, so the loop always returns.
  Err(ApiError::Aborted)
}
