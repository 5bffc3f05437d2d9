// stayflow/src/services/error.rs

use std::time::Duration;
use thiserror::Error;

/// How a single call to a booking endpoint failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
  #[error("Network connection failed: {0}")]
  Network(String),

  #[error("Request timed out after {}s", .0.as_secs())]
  Timeout(Duration),

  #[error("Request was aborted")]
  Aborted,

  #[error("Access denied (HTTP {status}). Please refresh the page and try again.")]
  Unauthorized { status: u16 },

  #[error("Server responded with HTTP {status}")]
  Status { status: u16, body: String },

  #[error("Unexpected response from server: {0}")]
  Decode(String),

  #[error("Security token not found. Please refresh the page and try again.")]
  MissingToken,
}

impl ApiError {
  /// Transport failures and non-auth error statuses are worth another attempt.
  /// Timeouts, aborts, auth failures and malformed bodies are not.
  pub fn is_retryable(&self) -> bool {
    matches!(self, ApiError::Network(_) | ApiError::Status { .. })
  }

  pub fn from_status(status: u16, body: String) -> Self {
    match status {
      401 | 403 => ApiError::Unauthorized { status },
      _ => ApiError::Status { status, body },
    }
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      return ApiError::Decode(err.to_string());
    }
    if let Some(status) = err.status() {
      return ApiError::from_status(status.as_u16(), String::new());
    }
    ApiError::Network(err.to_string())
  }
}
