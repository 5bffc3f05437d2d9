// stayflow/src/flow/state.rs

use super::error::FlowError;
use std::fmt;

/// Where a booking attempt is. Each attempt starts at `Idle` and ends in one
/// of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowState {
  #[default]
  Idle,
  AvailabilityChecking,
  AvailabilityConfirmed,
  AvailabilityRejected,
  DraftInvalid,
  AmountRegistering,
  PaymentSetupFailed,
  WidgetOpen,
  WidgetCancelled,
  PaymentVerifying,
  VerificationFailed,
  BookingSubmitting,
  BookingFailed,
  BookingConfirmed,
}

impl FlowState {
  pub fn can_transition_to(self, next: FlowState) -> bool {
    use FlowState::*;
    matches!(
      (self, next),
      (Idle, AvailabilityChecking)
        | (Idle, AvailabilityConfirmed)
        | (Idle, DraftInvalid)
        | (AvailabilityChecking, AvailabilityConfirmed)
        | (AvailabilityChecking, AvailabilityRejected)
        | (AvailabilityConfirmed, AmountRegistering)
        | (AvailabilityConfirmed, DraftInvalid)
        | (AmountRegistering, WidgetOpen)
        | (AmountRegistering, PaymentSetupFailed)
        | (WidgetOpen, WidgetCancelled)
        | (WidgetOpen, PaymentVerifying)
        | (WidgetOpen, PaymentSetupFailed)
        | (PaymentVerifying, VerificationFailed)
        | (PaymentVerifying, BookingSubmitting)
        | (BookingSubmitting, BookingFailed)
        | (BookingSubmitting, BookingConfirmed)
    )
  }

  /// Returns `next` if the move is allowed. Rejected moves leave the caller's state untouched.
  pub fn transition(self, next: FlowState) -> Result<FlowState, FlowError> {
    if self.can_transition_to(next) {
      Ok(next)
    } else {
      Err(FlowError::InvalidTransition { from: self, to: next })
    }
  }

  pub fn is_terminal(self) -> bool {
    use FlowState::*;
    matches!(
      self,
      AvailabilityRejected
        | DraftInvalid
        | PaymentSetupFailed
        | WidgetCancelled
        | VerificationFailed
        | BookingFailed
        | BookingConfirmed
    )
  }

  /// Every terminal state but a confirmed booking can be restarted.
  pub fn allows_retry(self) -> bool {
    self.is_terminal() && self != FlowState::BookingConfirmed
  }

  /// Terminal state an attempt lands in when a step fails in `self`.
  pub fn failure_state(self) -> Option<FlowState> {
    use FlowState::*;
    match self {
      Idle | AvailabilityConfirmed => Some(DraftInvalid),
      AvailabilityChecking => Some(AvailabilityRejected),
      AmountRegistering | WidgetOpen => Some(PaymentSetupFailed),
      PaymentVerifying => Some(VerificationFailed),
      BookingSubmitting => Some(BookingFailed),
      _ => None,
    }
  }

  /// Progress text for views.
  pub fn describe(self) -> &'static str {
    use FlowState::*;
    match self {
      Idle => "Ready",
      AvailabilityChecking => "Checking availability...",
      AvailabilityConfirmed => "Room available",
      AvailabilityRejected => "Room not available",
      DraftInvalid => "Please correct the booking details",
      AmountRegistering => "Preparing payment...",
      PaymentSetupFailed => "Payment could not be started",
      WidgetOpen => "Waiting for payment...",
      WidgetCancelled => "Payment cancelled",
      PaymentVerifying => "Verifying payment...",
      VerificationFailed => "Payment verification failed",
      BookingSubmitting => "Saving your booking...",
      BookingFailed => "Booking could not be saved",
      BookingConfirmed => "Booking confirmed",
    }
  }
}

impl fmt::Display for FlowState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(self, f)
  }
}
