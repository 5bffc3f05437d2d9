// stayflow/src/flow/view.rs

//! What the flow tells the guest, and the seam it tells it through.

use super::error::{ErrorCategory, FlowError};
use super::state::FlowState;
use crate::models::BookingResult;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Success,
  Warning,
  Error,
}

/// A titled, human-readable message shown when an attempt ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub severity: Severity,
  pub title: String,
  pub message: String,
}

impl Notice {
  pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      severity,
      title: title.into(),
      message: message.into(),
    }
  }

  pub fn confirmed(result: &BookingResult) -> Self {
    Self::new(
      Severity::Success,
      "Booking Confirmed",
      format!(
        "Your booking {} is confirmed. Transaction ID: {}.",
        result.booking_id, result.transaction_id
      ),
    )
  }

  pub fn cancelled() -> Self {
    Self::new(
      Severity::Warning,
      "Payment Cancelled",
      "Payment was cancelled. You can try again when you are ready.",
    )
  }

  pub fn failed(err: &FlowError) -> Self {
    let title = match err.category() {
      ErrorCategory::Validation => "Invalid Booking Details",
      ErrorCategory::Availability => "Room Not Available",
      ErrorCategory::Network => "Connection Problem",
      ErrorCategory::Authorization => "Session Expired",
      ErrorCategory::PaymentProvider => "Payment Failed",
      ErrorCategory::PostPayment => "Booking Not Recorded",
      ErrorCategory::Flow => "Booking Interrupted",
    };
    Self::new(Severity::Error, title, err.user_message())
  }
}

/// UI adapter driven by the flow. Calls are made without any flow lock held.
pub trait FlowView: Send + Sync {
  /// Disabled for the duration of an attempt, re-enabled once it ends.
  fn set_submit_enabled(&self, enabled: bool);

  fn show_progress(&self, state: FlowState);

  fn show_outcome(&self, notice: &Notice, result: Option<&BookingResult>);
}

/// A view that only logs. Useful headless and as a default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingView;

impl FlowView for TracingView {
  fn set_submit_enabled(&self, enabled: bool) {
    info!(enabled, "Submit control toggled.");
  }

  fn show_progress(&self, state: FlowState) {
    info!(%state, "{}", state.describe());
  }

  fn show_outcome(&self, notice: &Notice, result: Option<&BookingResult>) {
    let booking_id = result.map(|r| r.booking_id.as_str());
    match notice.severity {
      Severity::Error => error!(title = %notice.title, ?booking_id, "{}", notice.message),
      Severity::Warning => warn!(title = %notice.title, "{}", notice.message),
      Severity::Success => info!(title = %notice.title, ?booking_id, "{}", notice.message),
    }
  }
}
