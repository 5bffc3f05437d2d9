// stayflow/src/flow/error.rs

use super::state::FlowState;
use crate::error::PipelineError;
use crate::services::{ApiError, WidgetError};
use crate::validation::ValidationError;
use std::fmt;
use thiserror::Error;

/// The endpoint call a network failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  AvailabilityCheck,
  AmountRegistration,
  PaymentVerification,
  BookingSubmission,
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Operation::AvailabilityCheck => "checking availability",
      Operation::AmountRegistration => "preparing payment",
      Operation::PaymentVerification => "verifying payment",
      Operation::BookingSubmission => "submitting booking",
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFailure {
  /// The server could not be reached.
  Unreachable,
  TimedOut,
  /// The server answered with an error status.
  Rejected { status: u16 },
  /// The server answered with something that is not the expected JSON.
  InvalidResponse,
}

/// Broad class of a failure, for picking a notice title and deciding what to offer the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
  Validation,
  Availability,
  Network,
  Authorization,
  PaymentProvider,
  PostPayment,
  Flow,
}

#[derive(Debug, Error)]
pub enum FlowError {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("{message}")]
  Unavailable { message: String },

  #[error("{}", .errors.join(", "))]
  AvailabilityRejected { errors: Vec<String> },

  #[error("{}", network_message(.operation, .failure))]
  Network {
    operation: Operation,
    failure: NetworkFailure,
  },

  #[error("Access denied while {operation} (HTTP {status}). Please refresh the page and try again.")]
  Unauthorized { operation: Operation, status: u16 },

  #[error("Security token not found. Please refresh the page and try again.")]
  MissingToken,

  #[error("Failed to prepare payment: {}", .errors.join(", "))]
  AmountRejected { errors: Vec<String> },

  #[error(transparent)]
  Widget(#[from] WidgetError),

  #[error("Payment verification failed: {message}")]
  VerificationFailed { message: String },

  #[error(
    "Payment successful but booking failed: {reason}. Please contact support with payment reference \
     {reference} and transaction ID {transaction_id}."
  )]
  BookingNotRecorded {
    reference: String,
    transaction_id: String,
    reason: String,
  },

  #[error("The booking attempt was cancelled.")]
  Aborted,

  #[error("A booking attempt is already in progress.")]
  AttemptInProgress,

  #[error("This booking is already confirmed and cannot be retried.")]
  AlreadyConfirmed,

  #[error("Invalid state transition from {from} to {to}")]
  InvalidTransition { from: FlowState, to: FlowState },

  #[error("Step output missing: {0}")]
  MissingStepOutput(&'static str),

  #[error(transparent)]
  Pipeline(#[from] PipelineError),
}

fn network_message(operation: &Operation, failure: &NetworkFailure) -> String {
  match *failure {
    NetworkFailure::Unreachable => {
      format!("Network connection failed while {operation}. Please check your internet connection and try again.")
    }
    NetworkFailure::TimedOut => format!("The server took too long to respond while {operation}. Please try again."),
    NetworkFailure::Rejected { status } => {
      format!("The server rejected the request while {operation} (HTTP {status}). Please try again later.")
    }
    NetworkFailure::InvalidResponse => format!("Unexpected response from the server while {operation}."),
  }
}

impl FlowError {
  pub fn from_api(operation: Operation, err: ApiError) -> Self {
    match err {
      ApiError::Network(_) => FlowError::Network {
        operation,
        failure: NetworkFailure::Unreachable,
      },
      ApiError::Timeout(_) => FlowError::Network {
        operation,
        failure: NetworkFailure::TimedOut,
      },
      ApiError::Status { status, .. } => FlowError::Network {
        operation,
        failure: NetworkFailure::Rejected { status },
      },
      ApiError::Decode(_) => FlowError::Network {
        operation,
        failure: NetworkFailure::InvalidResponse,
      },
      ApiError::Unauthorized { status } => FlowError::Unauthorized { operation, status },
      ApiError::Aborted => FlowError::Aborted,
      ApiError::MissingToken => FlowError::MissingToken,
    }
  }

  pub fn category(&self) -> ErrorCategory {
    match self {
      FlowError::Validation(_) => ErrorCategory::Validation,
      FlowError::Unavailable { .. } | FlowError::AvailabilityRejected { .. } => ErrorCategory::Availability,
      FlowError::Network { .. } => ErrorCategory::Network,
      FlowError::Unauthorized { .. } | FlowError::MissingToken => ErrorCategory::Authorization,
      FlowError::AmountRejected { .. } | FlowError::Widget(_) | FlowError::VerificationFailed { .. } => {
        ErrorCategory::PaymentProvider
      }
      FlowError::BookingNotRecorded { .. } => ErrorCategory::PostPayment,
      FlowError::Aborted
      | FlowError::AttemptInProgress
      | FlowError::AlreadyConfirmed
      | FlowError::InvalidTransition { .. }
      | FlowError::MissingStepOutput(_)
      | FlowError::Pipeline(_) => ErrorCategory::Flow,
    }
  }

  /// Text suitable for the guest. Internal faults get a generic message.
  pub fn user_message(&self) -> String {
    match self {
      FlowError::InvalidTransition { .. } | FlowError::MissingStepOutput(_) | FlowError::Pipeline(_) => {
        "Something went wrong while processing your booking. Please try again.".to_string()
      }
      other => other.to_string(),
    }
  }
}
