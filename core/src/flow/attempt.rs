// stayflow/src/flow/attempt.rs

use super::error::FlowError;
use super::state::FlowState;
use super::view::FlowView;
use crate::config::FlowConfig;
use crate::models::{AvailabilityResult, BookingDraft, BookingResult, PaymentSession};
use crate::retry::AbortSignal;
use crate::services::{BookingApi, PaymentWidget};
use crate::validation::ValidatedDraft;
use std::sync::Arc;

/// Collaborators of one attempt.
#[derive(Clone)]
pub struct FlowDeps {
  pub api: Arc<dyn BookingApi>,
  pub widget: Arc<dyn PaymentWidget>,
  pub view: Arc<dyn FlowView>,
  pub config: Arc<FlowConfig>,
  pub abort: AbortSignal,
}

/// Per-attempt pipeline data. Created fresh for every submit.
#[derive(Clone)]
pub struct AttemptData {
  pub deps: FlowDeps,
  pub draft: Arc<BookingDraft>,
  pub state: FlowState,
  /// Every state entered, `Idle` first.
  pub history: Vec<FlowState>,

  pub availability: Option<AvailabilityResult>,
  pub validated: Option<ValidatedDraft>,
  pub session: Option<PaymentSession>,
  pub result: Option<BookingResult>,
}

impl AttemptData {
  pub fn new(deps: FlowDeps, draft: Arc<BookingDraft>) -> Self {
    Self {
      deps,
      draft,
      state: FlowState::Idle,
      history: vec![FlowState::Idle],
      availability: None,
      validated: None,
      session: None,
      result: None,
    }
  }

  /// Moves to `next`, or leaves the state unchanged and errors if the move is not allowed.
  pub fn advance(&mut self, next: FlowState) -> Result<(), FlowError> {
    self.state = self.state.transition(next)?;
    self.history.push(next);
    Ok(())
  }
}

impl std::fmt::Debug for AttemptData {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AttemptData")
      .field("state", &self.state)
      .field("history", &self.history)
      .field("session", &self.session)
      .finish_non_exhaustive()
  }
}
