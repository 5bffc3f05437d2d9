// stayflow/src/flow/mod.rs

//! `BookingPaymentFlow`: availability re-check, validation, amount
//! registration, checkout, verification and booking submission for one
//! booking form, one attempt at a time.

pub mod attempt;
pub mod error;
pub mod precheck;
pub mod state;
pub mod steps;
pub mod view;

pub use attempt::{AttemptData, FlowDeps};
pub use error::{ErrorCategory, FlowError, NetworkFailure, Operation};
pub use precheck::{check_availability, Precheck};
pub use state::FlowState;
pub use view::{FlowView, Notice, Severity, TracingView};

use crate::config::FlowConfig;
use crate::core::{ContextData, PipelineOutcome};
use crate::models::{BookingDraft, BookingResult, FormFields, PaymentSession};
use crate::receipt::Receipt;
use crate::retry::AbortSignal;
use crate::services::{BookingApi, PaymentWidget};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use steps::BookingPipeline;
use tracing::{error, info, instrument};

/// How an attempt ended.
#[derive(Debug)]
pub struct FlowOutcome {
  pub state: FlowState,
  pub notice: Notice,
  pub result: Option<BookingResult>,
  pub session: Option<PaymentSession>,
  pub error: Option<FlowError>,
  pub history: Vec<FlowState>,
}

impl FlowOutcome {
  pub fn is_confirmed(&self) -> bool {
    self.state == FlowState::BookingConfirmed
  }

  pub fn retry_available(&self) -> bool {
    self.state.allows_retry()
  }

  pub fn receipt(&self) -> Option<Receipt> {
    self.result.clone().map(Receipt::now)
  }
}

pub struct BookingPaymentFlow {
  api: Arc<dyn BookingApi>,
  widget: Arc<dyn PaymentWidget>,
  view: Arc<dyn FlowView>,
  config: Arc<FlowConfig>,
  pipeline: BookingPipeline,

  in_flight: AtomicBool,
  abort: Mutex<AbortSignal>,
  last_state: Mutex<FlowState>,
}

/// Clears the in-flight flag however the attempt ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
  fn acquire(flag: &'a AtomicBool) -> Result<Self, FlowError> {
    flag
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .map(|_| InFlight(flag))
      .map_err(|_| FlowError::AttemptInProgress)
  }
}

impl Drop for InFlight<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::Release);
  }
}

impl BookingPaymentFlow {
  pub fn new(
    api: Arc<dyn BookingApi>,
    widget: Arc<dyn PaymentWidget>,
    view: Arc<dyn FlowView>,
    config: FlowConfig,
  ) -> Result<Self, FlowError> {
    Ok(Self {
      api,
      widget,
      view,
      config: Arc::new(config),
      pipeline: steps::build_pipeline()?,
      in_flight: AtomicBool::new(false),
      abort: Mutex::new(AbortSignal::new()),
      last_state: Mutex::new(FlowState::Idle),
    })
  }

  pub fn last_state(&self) -> FlowState {
    *self.last_state.lock()
  }

  pub fn is_in_flight(&self) -> bool {
    self.in_flight.load(Ordering::Acquire)
  }

  /// Cancels the running attempt, if any. In-flight calls fail with `Aborted`.
  pub fn abort(&self) {
    info!("Booking attempt aborted by the guest.");
    self.abort.lock().abort();
  }

  /// Builds a draft from raw form fields and submits it. A form that does not
  /// make a draft ends the attempt in `DraftInvalid` without any network call.
  pub async fn submit_form(&self, form: &FormFields) -> Result<FlowOutcome, FlowError> {
    match BookingDraft::from_form(form) {
      Ok(draft) => self.submit(draft).await,
      Err(err) => {
        let _guard = InFlight::acquire(&self.in_flight)?;
        let err = FlowError::from(err);
        let notice = Notice::failed(&err);
        self.view.show_progress(FlowState::DraftInvalid);
        self.view.show_outcome(&notice, None);
        self.view.set_submit_enabled(true);
        *self.last_state.lock() = FlowState::DraftInvalid;
        Ok(FlowOutcome {
          state: FlowState::DraftInvalid,
          notice,
          result: None,
          session: None,
          error: Some(err),
          history: vec![FlowState::Idle, FlowState::DraftInvalid],
        })
      }
    }
  }

  /// Runs one attempt for `draft`.
  ///
  /// Fails fast with `AttemptInProgress` while another attempt runs. Every
  /// other failure is reported inside the returned `FlowOutcome`.
  #[instrument(name = "BookingPaymentFlow::submit", skip_all, fields(room_type = %draft.room.room_type_id))]
  pub async fn submit(&self, draft: BookingDraft) -> Result<FlowOutcome, FlowError> {
    // The slot stays locked until the new signal is in, so an `abort` can
    // never land on the previous attempt's signal once this one is in flight.
    let abort = AbortSignal::new();
    let _guard = {
      let mut slot = self.abort.lock();
      let guard = InFlight::acquire(&self.in_flight)?;
      *slot = abort.clone();
      guard
    };
    self.view.set_submit_enabled(false);

    let deps = FlowDeps {
      api: self.api.clone(),
      widget: self.widget.clone(),
      view: self.view.clone(),
      config: self.config.clone(),
      abort,
    };
    let ctx = ContextData::new(AttemptData::new(deps, Arc::new(draft)));
    let run = self.pipeline.run(ctx.clone()).await;
    let mut data = ctx.into_inner();

    let error = match run {
      Ok(PipelineOutcome::Completed) | Ok(PipelineOutcome::Halted) => None,
      Err(err) => {
        if let Some(failed) = data.state.failure_state() {
          if let Err(transition_err) = data.advance(failed) {
            error!(error = %transition_err, "Could not record failure state.");
          } else {
            self.view.show_progress(failed);
          }
        }
        Some(err)
      }
    };

    let notice = match (&error, &data.result) {
      (Some(err), _) => Notice::failed(err),
      (None, Some(result)) => Notice::confirmed(result),
      (None, None) => Notice::cancelled(),
    };

    info!(state = %data.state, confirmed = data.result.is_some(), "Booking attempt finished.");
    *self.last_state.lock() = data.state;
    self.view.show_outcome(&notice, data.result.as_ref());
    // A confirmed booking is not submitted twice from the same form.
    self.view.set_submit_enabled(data.state != FlowState::BookingConfirmed);

    Ok(FlowOutcome {
      state: data.state,
      notice,
      result: data.result,
      session: data.session,
      error,
      history: data.history,
    })
  }

  /// Restarts after a failed or cancelled attempt with a fresh payment reference.
  pub async fn retry(&self, draft: BookingDraft) -> Result<FlowOutcome, FlowError> {
    if self.last_state() == FlowState::BookingConfirmed {
      return Err(FlowError::AlreadyConfirmed);
    }
    self.submit(draft).await
  }
}
