// stayflow/src/flow/steps.rs

//! The booking attempt as a pipeline: one named step per endpoint call, with
//! state changes in `before`/`after` hooks and the work in `on` hooks.

use super::attempt::AttemptData;
use super::error::{FlowError, Operation};
use super::state::FlowState;
use crate::core::{ContextData, StepControl, StepDef};
use crate::error::PipelineError;
use crate::models::{AvailabilityRequest, AvailabilityResult, BookingResult, BookingSubmission, PaymentSession};
use crate::pipeline::Pipeline;
use crate::retry::retry_with_backoff;
use crate::services::{CheckoutRequest, WidgetOutcome};
use crate::validation::validate_draft;
use tracing::{info, warn};

pub const CHECK_AVAILABILITY: &str = "check_availability";
pub const VALIDATE_DRAFT: &str = "validate_draft";
pub const REGISTER_EXPECTED_AMOUNT: &str = "register_expected_amount";
pub const OPEN_PAYMENT_WIDGET: &str = "open_payment_widget";
pub const VERIFY_PAYMENT: &str = "verify_payment";
pub const SUBMIT_BOOKING: &str = "submit_booking";

pub type BookingPipeline = Pipeline<AttemptData, FlowError>;

pub fn build_pipeline() -> Result<BookingPipeline, PipelineError> {
  let mut p = BookingPipeline::new(vec![
    StepDef::required(CHECK_AVAILABILITY).skip_when(|ctx: &ContextData<AttemptData>| {
      !ctx.read().deps.config.recheck_availability
    }),
    StepDef::required(VALIDATE_DRAFT),
    StepDef::required(REGISTER_EXPECTED_AMOUNT),
    StepDef::required(OPEN_PAYMENT_WIDGET),
    StepDef::required(VERIFY_PAYMENT),
    StepDef::required(SUBMIT_BOOKING),
  ])?;

  p.before(CHECK_AVAILABILITY, |ctx| enter(ctx, FlowState::AvailabilityChecking))?;
  p.on(CHECK_AVAILABILITY, check_availability)?;
  p.after(CHECK_AVAILABILITY, |ctx| enter(ctx, FlowState::AvailabilityConfirmed))?;

  p.before(VALIDATE_DRAFT, confirm_without_recheck)?;
  p.on(VALIDATE_DRAFT, validate)?;

  p.before(REGISTER_EXPECTED_AMOUNT, |ctx| enter(ctx, FlowState::AmountRegistering))?;
  p.on(REGISTER_EXPECTED_AMOUNT, register_expected_amount)?;

  p.before(OPEN_PAYMENT_WIDGET, |ctx| enter(ctx, FlowState::WidgetOpen))?;
  p.on(OPEN_PAYMENT_WIDGET, open_payment_widget)?;

  p.before(VERIFY_PAYMENT, |ctx| enter(ctx, FlowState::PaymentVerifying))?;
  p.on(VERIFY_PAYMENT, verify_payment)?;

  p.before(SUBMIT_BOOKING, |ctx| enter(ctx, FlowState::BookingSubmitting))?;
  p.on(SUBMIT_BOOKING, submit_booking)?;
  p.after(SUBMIT_BOOKING, |ctx| enter(ctx, FlowState::BookingConfirmed))?;

  Ok(p)
}

/// Applies a transition and reports it to the view once the lock is released.
pub(crate) fn advance(ctx: &ContextData<AttemptData>, next: FlowState) -> Result<(), FlowError> {
  let view = {
    let mut guard = ctx.write();
    guard.advance(next)?;
    guard.deps.view.clone()
  };
  view.show_progress(next);
  Ok(())
}

async fn enter(ctx: ContextData<AttemptData>, next: FlowState) -> Result<StepControl, FlowError> {
  advance(&ctx, next)?;
  Ok(StepControl::Proceed)
}

/// With the re-check skipped, availability is taken as confirmed.
async fn confirm_without_recheck(ctx: ContextData<AttemptData>) -> Result<StepControl, FlowError> {
  let state = ctx.read().state;
  if state == FlowState::Idle {
    info!("Availability re-check disabled; proceeding on the form's availability.");
    advance(&ctx, FlowState::AvailabilityConfirmed)?;
  }
  Ok(StepControl::Proceed)
}

async fn check_availability(ctx: ContextData<AttemptData>) -> Result<StepControl, FlowError> {
  let (deps, request) = {
    let guard = ctx.read();
    (guard.deps.clone(), AvailabilityRequest::from_draft(&guard.draft))
  };

  let response = retry_with_backoff(&deps.config.retry, CHECK_AVAILABILITY, &deps.abort, || {
    deps.api.check_availability(&request)
  })
  .await
  .map_err(|e| FlowError::from_api(Operation::AvailabilityCheck, e))?;

  let result = AvailabilityResult::classify(response, &deps.config.available_message);
  ctx.write().availability = Some(result.clone());
  match result {
    AvailabilityResult::Available { .. } => Ok(StepControl::Proceed),
    AvailabilityResult::Unavailable { message } => {
      info!(%message, "Room not available.");
      Err(FlowError::Unavailable { message })
    }
    AvailabilityResult::Rejected { errors } => {
      info!(?errors, "Availability check rejected.");
      Err(FlowError::AvailabilityRejected { errors })
    }
  }
}

async fn validate(ctx: ContextData<AttemptData>) -> Result<StepControl, FlowError> {
  let mut guard = ctx.write();
  let today = chrono::Local::now().date_naive();
  let validated = validate_draft(&guard.draft, &guard.deps.config.country_calling_code, today)?;
  guard.validated = Some(validated);
  Ok(StepControl::Proceed)
}

async fn register_expected_amount(ctx: ContextData<AttemptData>) -> Result<StepControl, FlowError> {
  let (deps, validated) = {
    let guard = ctx.read();
    (guard.deps.clone(), guard.validated.clone())
  };
  let validated = validated.ok_or(FlowError::MissingStepOutput(VALIDATE_DRAFT))?;

  let session = PaymentSession::new(validated.amount, validated.amount_minor);
  info!(reference = %session.reference, amount = %session.amount, "Registering expected amount.");

  let ack = retry_with_backoff(&deps.config.retry, REGISTER_EXPECTED_AMOUNT, &deps.abort, || {
    deps.api.store_expected_amount(validated.amount)
  })
  .await
  .map_err(|e| FlowError::from_api(Operation::AmountRegistration, e))?;

  if !ack.success {
    return Err(FlowError::AmountRejected { errors: ack.errors });
  }
  ctx.write().session = Some(session);
  Ok(StepControl::Proceed)
}

async fn open_payment_widget(ctx: ContextData<AttemptData>) -> Result<StepControl, FlowError> {
  let (deps, validated, reference) = {
    let guard = ctx.read();
    (
      guard.deps.clone(),
      guard.validated.clone(),
      guard.session.as_ref().map(|s| s.reference.clone()),
    )
  };
  let validated = validated.ok_or(FlowError::MissingStepOutput(VALIDATE_DRAFT))?;
  let reference = reference.ok_or(FlowError::MissingStepOutput(REGISTER_EXPECTED_AMOUNT))?;

  let request = CheckoutRequest::new(&deps.config, &validated, &reference);
  let outcome = deps
    .abort
    .guard(deps.widget.open(request))
    .await
    .map_err(|_| FlowError::Aborted)??;

  match outcome {
    WidgetOutcome::Cancelled => {
      info!(%reference, "Guest closed the payment widget.");
      advance(&ctx, FlowState::WidgetCancelled)?;
      Ok(StepControl::Halt)
    }
    WidgetOutcome::Completed { reference: provider_reference } => {
      info!(%reference, %provider_reference, "Payment completed in widget.");
      if let Some(session) = ctx.write().session.as_mut() {
        session.provider_reference = Some(provider_reference);
      }
      Ok(StepControl::Proceed)
    }
  }
}

async fn verify_payment(ctx: ContextData<AttemptData>) -> Result<StepControl, FlowError> {
  let (deps, reference) = {
    let guard = ctx.read();
    (
      guard.deps.clone(),
      guard.session.as_ref().map(|s| s.verification_reference().to_string()),
    )
  };
  let reference = reference.ok_or(FlowError::MissingStepOutput(OPEN_PAYMENT_WIDGET))?;

  let verification = retry_with_backoff(&deps.config.retry, VERIFY_PAYMENT, &deps.abort, || {
    deps.api.verify_payment(&reference)
  })
  .await
  .map_err(|e| FlowError::from_api(Operation::PaymentVerification, e))?;

  if !verification.is_success() {
    let message = verification
      .message
      .unwrap_or_else(|| format!("unexpected status \"{}\"", verification.status));
    warn!(%reference, %message, "Payment not verified.");
    return Err(FlowError::VerificationFailed { message });
  }

  let transaction_id = verification.transaction_id.unwrap_or_else(|| reference.clone());
  info!(%reference, %transaction_id, "Payment verified.");
  if let Some(session) = ctx.write().session.as_mut() {
    session.transaction_id = Some(transaction_id);
  }
  Ok(StepControl::Proceed)
}

async fn submit_booking(ctx: ContextData<AttemptData>) -> Result<StepControl, FlowError> {
  let (deps, draft, validated, session) = {
    let guard = ctx.read();
    (
      guard.deps.clone(),
      guard.draft.clone(),
      guard.validated.clone(),
      guard.session.clone(),
    )
  };
  let validated = validated.ok_or(FlowError::MissingStepOutput(VALIDATE_DRAFT))?;
  let session = session.ok_or(FlowError::MissingStepOutput(REGISTER_EXPECTED_AMOUNT))?;
  let transaction_id = session
    .transaction_id
    .clone()
    .ok_or(FlowError::MissingStepOutput(VERIFY_PAYMENT))?;
  let reference = session.verification_reference().to_string();

  let not_recorded = |reason: String| {
    warn!(%reference, %transaction_id, %reason, "Paid booking was not recorded.");
    FlowError::BookingNotRecorded {
      reference: reference.clone(),
      transaction_id: transaction_id.clone(),
      reason,
    }
  };

  let submission = BookingSubmission::new(&draft, &validated, transaction_id.clone());
  let response = retry_with_backoff(&deps.config.retry.no_retry(), SUBMIT_BOOKING, &deps.abort, || {
    deps.api.submit_booking(&submission)
  })
  .await
  .map_err(|e| not_recorded(FlowError::from_api(Operation::BookingSubmission, e).user_message()))?;

  if !response.success {
    let reason = if response.errors.is_empty() {
      "the server did not accept the booking".to_string()
    } else {
      response.errors.join(", ")
    };
    return Err(not_recorded(reason));
  }
  let booking_id = response
    .booking_id
    .ok_or_else(|| not_recorded("no booking ID was returned".to_string()))?;

  info!(%booking_id, %reference, "Booking recorded.");
  let result = BookingResult::new(&draft, &submission, booking_id, reference.clone());
  ctx.write().result = Some(result);
  Ok(StepControl::Proceed)
}
