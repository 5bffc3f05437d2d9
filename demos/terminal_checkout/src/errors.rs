// demos/terminal_checkout/src/errors.rs

use stayflow::{ConfigError, FlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Usage: terminal_checkout <booking-form.json>")]
  Usage,

  #[error("Configuration Error: {0}")]
  Config(#[from] ConfigError),

  #[error("Could not read booking form {path}: {source}")]
  FormFile {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Booking form is not a JSON object of field names to values: {0}")]
  FormJson(#[from] serde_json::Error),

  #[error("Booking Flow Error: {0}")]
  Flow(#[from] FlowError),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
