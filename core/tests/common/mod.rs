// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use stayflow::flow::{FlowView, Notice};
use stayflow::models::{
  AmountAck, AvailabilityRequest, AvailabilityResponse, BookingResponse, BookingSubmission, GuestIdentity, Pricing,
  RoomSelection, StayDates, VerificationResponse,
};
use stayflow::services::{ApiError, BookingApi, CheckoutRequest, PaymentWidget, WidgetError, WidgetOutcome};
use stayflow::{BookingDraft, BookingPaymentFlow, BookingResult, FlowConfig, FlowState};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

// --- Tracing ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Fixtures ---
pub fn test_config() -> FlowConfig {
  FlowConfig {
    base_url: "http://booking.test".to_string(),
    paystack_public_key: "pk_test_stayflow".to_string(),
    ..FlowConfig::default()
  }
}

/// Two weeks out, so fixtures never fall behind the calendar.
pub fn checkin_date() -> NaiveDate {
  Local::now().date_naive() + Days::new(14)
}

pub fn draft() -> BookingDraft {
  BookingDraft {
    guest: GuestIdentity {
      first_name: "Ada".into(),
      last_name: "Obi".into(),
      email: "ada@example.com".into(),
      phone: "08031234567".into(),
    },
    stay: StayDates {
      checkin: checkin_date(),
      checkout: checkin_date() + Days::new(2),
    },
    room: RoomSelection {
      room_type_id: "2".into(),
      room_type_label: "Deluxe".into(),
      rooms: 1,
      guests: 2,
    },
    pricing: Pricing {
      base_price: "₦25,000.00".into(),
      total_cost: "₦50,000.00".into(),
    },
    special_requests: Some("Late check-in".into()),
  }
}

pub fn draft_with_total(total_cost: &str) -> BookingDraft {
  let mut d = draft();
  d.pricing.total_cost = total_cost.to_string();
  d
}

pub fn network_down() -> ApiError {
  ApiError::Network("connection refused".into())
}

pub fn server_error() -> ApiError {
  ApiError::Status {
    status: 500,
    body: "Internal Server Error".into(),
  }
}

// --- Scripted booking API ---
/// Each endpoint answers from its script first, then with a success default.
#[derive(Default)]
pub struct FakeApi {
  pub availability_script: Mutex<VecDeque<Result<AvailabilityResponse, ApiError>>>,
  pub amount_script: Mutex<VecDeque<Result<AmountAck, ApiError>>>,
  pub verify_script: Mutex<VecDeque<Result<VerificationResponse, ApiError>>>,
  pub booking_script: Mutex<VecDeque<Result<BookingResponse, ApiError>>>,

  /// Applied to every amount registration call.
  pub amount_delay: Mutex<Option<Duration>>,

  pub availability_calls: AtomicUsize,
  pub amount_calls: AtomicUsize,
  pub verify_calls: AtomicUsize,
  pub booking_calls: AtomicUsize,

  pub availability_requests: Mutex<Vec<AvailabilityRequest>>,
  pub amounts: Mutex<Vec<Decimal>>,
  pub verified_references: Mutex<Vec<String>>,
  pub submissions: Mutex<Vec<BookingSubmission>>,
}

impl FakeApi {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn script_availability(&self, answer: Result<AvailabilityResponse, ApiError>) -> &Self {
    self.availability_script.lock().push_back(answer);
    self
  }

  pub fn script_amount(&self, answer: Result<AmountAck, ApiError>) -> &Self {
    self.amount_script.lock().push_back(answer);
    self
  }

  pub fn script_verify(&self, answer: Result<VerificationResponse, ApiError>) -> &Self {
    self.verify_script.lock().push_back(answer);
    self
  }

  pub fn script_booking(&self, answer: Result<BookingResponse, ApiError>) -> &Self {
    self.booking_script.lock().push_back(answer);
    self
  }

  pub fn calls(&self) -> (usize, usize, usize, usize) {
    (
      self.availability_calls.load(Ordering::SeqCst),
      self.amount_calls.load(Ordering::SeqCst),
      self.verify_calls.load(Ordering::SeqCst),
      self.booking_calls.load(Ordering::SeqCst),
    )
  }
}

pub fn available() -> AvailabilityResponse {
  AvailabilityResponse {
    availability_message: Some("Room available".into()),
    errors: vec![],
  }
}

pub fn verified(transaction_id: &str) -> VerificationResponse {
  VerificationResponse {
    status: "success".into(),
    message: Some("Payment verified".into()),
    transaction_id: Some(transaction_id.into()),
  }
}

pub fn booked(booking_id: &str) -> BookingResponse {
  BookingResponse {
    success: true,
    booking_id: Some(booking_id.into()),
    errors: vec![],
  }
}

#[async_trait]
impl BookingApi for FakeApi {
  async fn check_availability(&self, request: &AvailabilityRequest) -> Result<AvailabilityResponse, ApiError> {
    self.availability_calls.fetch_add(1, Ordering::SeqCst);
    self.availability_requests.lock().push(request.clone());
    let scripted = self.availability_script.lock().pop_front();
    scripted.unwrap_or_else(|| Ok(available()))
  }

  async fn store_expected_amount(&self, amount: Decimal) -> Result<AmountAck, ApiError> {
    self.amount_calls.fetch_add(1, Ordering::SeqCst);
    self.amounts.lock().push(amount);
    let delay = *self.amount_delay.lock();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    let scripted = self.amount_script.lock().pop_front();
    scripted.unwrap_or_else(|| {
      Ok(AmountAck {
        success: true,
        errors: vec![],
      })
    })
  }

  async fn verify_payment(&self, reference: &str) -> Result<VerificationResponse, ApiError> {
    self.verify_calls.fetch_add(1, Ordering::SeqCst);
    self.verified_references.lock().push(reference.to_string());
    let scripted = self.verify_script.lock().pop_front();
    scripted.unwrap_or_else(|| Ok(verified("T-1")))
  }

  async fn submit_booking(&self, submission: &BookingSubmission) -> Result<BookingResponse, ApiError> {
    self.booking_calls.fetch_add(1, Ordering::SeqCst);
    self.submissions.lock().push(submission.clone());
    let scripted = self.booking_script.lock().pop_front();
    scripted.unwrap_or_else(|| Ok(booked("B100")))
  }
}

// --- Scripted checkout widget ---
#[derive(Debug, Clone)]
pub enum WidgetScript {
  PayWith(String),
  Cancel,
  Unavailable,
}

pub struct FakeWidget {
  script: Mutex<VecDeque<WidgetScript>>,
  pub opened: Mutex<Vec<CheckoutRequest>>,
}

impl FakeWidget {
  pub fn new(script: impl IntoIterator<Item = WidgetScript>) -> Arc<Self> {
    Arc::new(Self {
      script: Mutex::new(script.into_iter().collect()),
      opened: Mutex::new(Vec::new()),
    })
  }

  pub fn paying(reference: &str) -> Arc<Self> {
    Self::new([WidgetScript::PayWith(reference.to_string())])
  }

  pub fn open_count(&self) -> usize {
    self.opened.lock().len()
  }
}

#[async_trait]
impl PaymentWidget for FakeWidget {
  async fn open(&self, request: CheckoutRequest) -> Result<WidgetOutcome, WidgetError> {
    let fallback = request.reference.clone();
    self.opened.lock().push(request);
    let next = self.script.lock().pop_front();
    match next {
      Some(WidgetScript::PayWith(reference)) => Ok(WidgetOutcome::Completed { reference }),
      Some(WidgetScript::Cancel) => Ok(WidgetOutcome::Cancelled),
      Some(WidgetScript::Unavailable) => Err(WidgetError::Unavailable),
      None => Ok(WidgetOutcome::Completed { reference: fallback }),
    }
  }
}

// --- Recording view ---
#[derive(Default)]
pub struct RecordingView {
  pub submit_toggles: Mutex<Vec<bool>>,
  pub progress: Mutex<Vec<FlowState>>,
  pub outcomes: Mutex<Vec<(Notice, Option<BookingResult>)>>,
}

impl RecordingView {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn last_submit_enabled(&self) -> Option<bool> {
    self.submit_toggles.lock().last().copied()
  }
}

impl FlowView for RecordingView {
  fn set_submit_enabled(&self, enabled: bool) {
    self.submit_toggles.lock().push(enabled);
  }

  fn show_progress(&self, state: FlowState) {
    self.progress.lock().push(state);
  }

  fn show_outcome(&self, notice: &Notice, result: Option<&BookingResult>) {
    self.outcomes.lock().push((notice.clone(), result.cloned()));
  }
}

pub fn flow_with(
  api: &Arc<FakeApi>,
  widget: &Arc<FakeWidget>,
  view: &Arc<RecordingView>,
  config: FlowConfig,
) -> BookingPaymentFlow {
  BookingPaymentFlow::new(api.clone(), widget.clone(), view.clone(), config).expect("pipeline builds")
}
