// tests/booking_flow_tests.rs
mod common;

use common::*;
use once_cell::sync::OnceCell;
use rust_decimal_macros::dec;
use stayflow::flow::{ErrorCategory, FlowError, FlowView, NetworkFailure, Notice, Severity};
use stayflow::models::{AmountAck, AvailabilityResponse, BookingResponse, VerificationResponse};
use stayflow::services::ApiError;
use stayflow::{BookingPaymentFlow, BookingResult, FlowConfig, FlowState, FormFields};
use std::sync::{Arc, Weak};
use std::time::Duration;

#[tokio::test]
async fn successful_booking_ends_confirmed_with_server_booking_id() {
  setup_tracing();
  let api = FakeApi::new();
  api.script_verify(Ok(verified("T9")));
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let outcome = flow.submit(draft()).await.unwrap();

  assert_eq!(outcome.state, FlowState::BookingConfirmed);
  assert!(outcome.error.is_none());
  let result = outcome.result.as_ref().unwrap();
  assert_eq!(result.booking_id, "B100");
  assert_eq!(result.transaction_id, "T9");
  assert_eq!(result.reference, "R1");
  assert_eq!(result.room_type, "Deluxe");
  assert_eq!(
    outcome.history,
    vec![
      FlowState::Idle,
      FlowState::AvailabilityChecking,
      FlowState::AvailabilityConfirmed,
      FlowState::AmountRegistering,
      FlowState::WidgetOpen,
      FlowState::PaymentVerifying,
      FlowState::BookingSubmitting,
      FlowState::BookingConfirmed,
    ]
  );
  assert_eq!(api.calls(), (1, 1, 1, 1));
  assert_eq!(*api.verified_references.lock(), vec!["R1".to_string()]);
  assert_eq!(*api.amounts.lock(), vec![dec!(50000.00)]);
  assert_eq!(outcome.notice.severity, Severity::Success);
  assert!(!outcome.retry_available());
  assert_eq!(flow.last_state(), FlowState::BookingConfirmed);

  let receipt = outcome.receipt().unwrap().to_string();
  assert!(receipt.contains("B100"));
}

#[tokio::test]
async fn submission_carries_normalised_phone_and_verified_transaction() {
  let api = FakeApi::new();
  api.script_verify(Ok(verified("T9")));
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  flow.submit(draft()).await.unwrap();

  let submissions = api.submissions.lock();
  let submission = &submissions[0];
  assert_eq!(submission.phone, "+2348031234567");
  assert_eq!(submission.transaction_id, "T9");
  assert_eq!(submission.payment_status, "success");
  let fields = submission.form_fields();
  assert!(fields.contains(&("modalRooms", "1".to_string())));
  assert!(fields.contains(&("special_requests", "Late check-in".to_string())));

  let opened = widget.opened.lock();
  assert_eq!(opened[0].amount, 5_000_000);
  assert_eq!(opened[0].currency, "NGN");
  assert_eq!(opened[0].key, "pk_test_stayflow");
  assert!(opened[0].reference.starts_with("HOTEL-BKG-"));
  assert_eq!(opened[0].metadata.custom_fields[0].value, "+2348031234567");
  assert_eq!(opened[0].metadata.custom_fields[1].value, "Ada Obi");

  let availability = api.availability_requests.lock();
  assert_eq!(availability[0].rooms, 1);
  assert_eq!(availability[0].guest, 2);
}

#[tokio::test]
async fn missing_transaction_id_falls_back_to_reference() {
  let api = FakeApi::new();
  api.script_verify(Ok(VerificationResponse {
    status: "success".into(),
    message: None,
    transaction_id: None,
  }));
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let outcome = flow.submit(draft()).await.unwrap();
  assert_eq!(outcome.result.unwrap().transaction_id, "R1");
}

#[tokio::test]
async fn failed_verification_never_submits() {
  let api = FakeApi::new();
  api.script_verify(Ok(VerificationResponse {
    status: "failed".into(),
    message: Some("Amount mismatch".into()),
    transaction_id: None,
  }));
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let outcome = flow.submit(draft()).await.unwrap();

  assert_eq!(outcome.state, FlowState::VerificationFailed);
  assert!(matches!(outcome.error, Some(FlowError::VerificationFailed { .. })));
  assert!(outcome.notice.message.contains("Amount mismatch"));
  assert_eq!(api.booking_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
  assert!(outcome.retry_available());
  assert_eq!(view.last_submit_enabled(), Some(true));
}

#[tokio::test]
async fn cancelled_widget_skips_verification_and_submission() {
  let api = FakeApi::new();
  let widget = FakeWidget::new([WidgetScript::Cancel]);
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let outcome = flow.submit(draft()).await.unwrap();

  assert_eq!(outcome.state, FlowState::WidgetCancelled);
  assert!(outcome.error.is_none());
  assert_eq!(outcome.notice.severity, Severity::Warning);
  assert_eq!(api.calls(), (1, 1, 0, 0));
  assert!(outcome.retry_available());
}

#[tokio::test]
async fn unavailable_widget_is_a_payment_setup_failure() {
  let api = FakeApi::new();
  let widget = FakeWidget::new([WidgetScript::Unavailable]);
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let outcome = flow.submit(draft()).await.unwrap();

  assert_eq!(outcome.state, FlowState::PaymentSetupFailed);
  assert_eq!(outcome.error.as_ref().unwrap().category(), ErrorCategory::PaymentProvider);
  assert!(outcome.notice.message.contains("Payment system not available"));
  assert_eq!(api.calls(), (1, 1, 0, 0));
}

#[tokio::test]
async fn invalid_total_cost_stops_before_any_charge() {
  for total in ["₦0.00", "-5", "N/A", "abc"] {
    let api = FakeApi::new();
    let widget = FakeWidget::paying("R1");
    let view = RecordingView::new();
    let flow = flow_with(&api, &widget, &view, test_config());

    let outcome = flow.submit(draft_with_total(total)).await.unwrap();

    assert_eq!(outcome.state, FlowState::DraftInvalid, "total {total}");
    assert_eq!(outcome.error.as_ref().unwrap().category(), ErrorCategory::Validation);
    assert_eq!(api.calls(), (1, 0, 0, 0));
    assert_eq!(widget.open_count(), 0);
  }
}

#[tokio::test]
async fn invalid_email_and_phone_are_rejected() {
  let api = FakeApi::new();
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let mut bad_email = draft();
  bad_email.guest.email = "ada@example".into();
  let outcome = flow.submit(bad_email).await.unwrap();
  assert_eq!(outcome.state, FlowState::DraftInvalid);

  let mut bad_phone = draft();
  bad_phone.guest.phone = "0803".into();
  let outcome = flow.submit(bad_phone).await.unwrap();
  assert_eq!(outcome.state, FlowState::DraftInvalid);
  assert!(outcome.notice.message.contains("valid phone number"));

  assert_eq!(api.amount_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn past_checkin_stops_before_any_charge() {
  let api = FakeApi::new();
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let mut stale = draft();
  stale.stay.checkin = chrono::NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
  stale.stay.checkout = chrono::NaiveDate::from_ymd_opt(2001, 1, 3).unwrap();
  let outcome = flow.submit(stale).await.unwrap();

  assert_eq!(outcome.state, FlowState::DraftInvalid);
  assert_eq!(outcome.notice.message, "Check-in date cannot be in the past.");
  assert_eq!(api.calls(), (1, 0, 0, 0));
  assert_eq!(widget.open_count(), 0);
}

#[tokio::test]
async fn availability_errors_short_circuit() {
  let api = FakeApi::new();
  api.script_availability(Ok(AvailabilityResponse {
    availability_message: Some("Room available".into()),
    errors: vec!["Check-out must be after check-in.".into(), "Invalid room type.".into()],
  }));
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let outcome = flow.submit(draft()).await.unwrap();

  assert_eq!(outcome.state, FlowState::AvailabilityRejected);
  assert_eq!(
    outcome.notice.message,
    "Check-out must be after check-in., Invalid room type."
  );
  assert_eq!(api.calls(), (1, 0, 0, 0));
}

#[tokio::test]
async fn any_other_availability_message_is_unavailable() {
  let api = FakeApi::new();
  api.script_availability(Ok(AvailabilityResponse {
    availability_message: Some("Only 0 rooms left".into()),
    errors: vec![],
  }));
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let outcome = flow.submit(draft()).await.unwrap();

  assert_eq!(outcome.state, FlowState::AvailabilityRejected);
  assert_eq!(outcome.notice.message, "Only 0 rooms left");
  assert_eq!(widget.open_count(), 0);
}

#[tokio::test]
async fn empty_availability_answer_still_explains_itself() {
  let api = FakeApi::new();
  api.script_availability(Ok(AvailabilityResponse::default()));
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let outcome = flow.submit(draft()).await.unwrap();

  assert_eq!(outcome.state, FlowState::AvailabilityRejected);
  assert_eq!(outcome.notice.title, "Room Not Available");
  assert_eq!(outcome.notice.message, "Room not available for the selected dates.");
  assert_eq!(api.calls(), (1, 0, 0, 0));
}

#[tokio::test]
async fn disabled_recheck_skips_availability() {
  let api = FakeApi::new();
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let config = FlowConfig {
    recheck_availability: false,
    ..test_config()
  };
  let flow = flow_with(&api, &widget, &view, config);

  let outcome = flow.submit(draft()).await.unwrap();

  assert_eq!(outcome.state, FlowState::BookingConfirmed);
  assert_eq!(outcome.history[1], FlowState::AvailabilityConfirmed);
  assert_eq!(api.calls(), (0, 1, 1, 1));
}

#[tokio::test(start_paused = true)]
async fn amount_registration_retries_transient_failures() {
  let api = FakeApi::new();
  api.script_amount(Err(network_down())).script_amount(Err(server_error()));
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let started = tokio::time::Instant::now();
  let outcome = flow.submit(draft()).await.unwrap();

  assert_eq!(outcome.state, FlowState::BookingConfirmed);
  assert_eq!(api.amount_calls.load(std::sync::atomic::Ordering::SeqCst), 3);
  // 2s after the first failure, 4s after the second.
  assert!(started.elapsed() >= Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn unauthorized_is_never_retried() {
  let api = FakeApi::new();
  api.script_amount(Err(ApiError::Unauthorized { status: 401 }));
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let outcome = flow.submit(draft()).await.unwrap();

  assert_eq!(outcome.state, FlowState::PaymentSetupFailed);
  assert_eq!(api.amount_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
  assert_eq!(outcome.error.as_ref().unwrap().category(), ErrorCategory::Authorization);
  assert!(outcome.notice.message.contains("refresh the page"));
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_report_server_rejection() {
  let api = FakeApi::new();
  api
    .script_verify(Err(server_error()))
    .script_verify(Err(server_error()))
    .script_verify(Err(server_error()));
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let outcome = flow.submit(draft()).await.unwrap();

  assert_eq!(outcome.state, FlowState::VerificationFailed);
  assert!(matches!(
    outcome.error,
    Some(FlowError::Network {
      failure: NetworkFailure::Rejected { status: 500 },
      ..
    })
  ));
  assert_eq!(api.calls(), (1, 1, 3, 0));
}

#[tokio::test]
async fn rejected_amount_opens_no_widget() {
  let api = FakeApi::new();
  api.script_amount(Ok(AmountAck {
    success: false,
    errors: vec!["Invalid amount".into()],
  }));
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let outcome = flow.submit(draft()).await.unwrap();

  assert_eq!(outcome.state, FlowState::PaymentSetupFailed);
  assert!(outcome.notice.message.contains("Invalid amount"));
  assert_eq!(widget.open_count(), 0);
}

#[tokio::test]
async fn failed_submission_after_payment_names_reference_and_transaction() {
  let api = FakeApi::new();
  api.script_verify(Ok(verified("T9"))).script_booking(Ok(BookingResponse {
    success: false,
    booking_id: None,
    errors: vec!["Room no longer available".into()],
  }));
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let outcome = flow.submit(draft()).await.unwrap();

  assert_eq!(outcome.state, FlowState::BookingFailed);
  assert_eq!(outcome.error.as_ref().unwrap().category(), ErrorCategory::PostPayment);
  let message = &outcome.notice.message;
  assert!(message.starts_with("Payment successful but booking failed"));
  assert!(message.contains("R1"));
  assert!(message.contains("T9"));
  assert!(message.contains("Room no longer available"));
  assert_eq!(outcome.session.unwrap().transaction_id.as_deref(), Some("T9"));
}

#[tokio::test(start_paused = true)]
async fn booking_submission_is_attempted_once() {
  let api = FakeApi::new();
  api.script_booking(Err(network_down()));
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let outcome = flow.submit(draft()).await.unwrap();

  assert_eq!(outcome.state, FlowState::BookingFailed);
  assert_eq!(api.booking_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
  assert!(matches!(outcome.error, Some(FlowError::BookingNotRecorded { .. })));
}

#[tokio::test(start_paused = true)]
async fn second_submit_while_in_flight_fails_fast() {
  let api = FakeApi::new();
  *api.amount_delay.lock() = Some(Duration::from_secs(5));
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = Arc::new(flow_with(&api, &widget, &view, test_config()));

  let first = tokio::spawn({
    let flow = flow.clone();
    async move { flow.submit(draft()).await }
  });
  while !flow.is_in_flight() {
    tokio::task::yield_now().await;
  }

  let second = flow.submit(draft()).await;
  assert!(matches!(second, Err(FlowError::AttemptInProgress)));

  let outcome = first.await.unwrap().unwrap();
  assert_eq!(outcome.state, FlowState::BookingConfirmed);
  assert_eq!(api.amount_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
  assert_eq!(view.submit_toggles.lock().first(), Some(&false));
}

#[tokio::test(start_paused = true)]
async fn abort_interrupts_in_flight_call_without_retry() {
  let api = FakeApi::new();
  *api.amount_delay.lock() = Some(Duration::from_secs(10));
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = Arc::new(flow_with(&api, &widget, &view, test_config()));

  let attempt = tokio::spawn({
    let flow = flow.clone();
    async move { flow.submit(draft()).await }
  });
  while api.amount_calls.load(std::sync::atomic::Ordering::SeqCst) == 0 {
    tokio::task::yield_now().await;
  }
  flow.abort();

  let outcome = attempt.await.unwrap().unwrap();
  assert_eq!(outcome.state, FlowState::PaymentSetupFailed);
  assert!(matches!(outcome.error, Some(FlowError::Aborted)));
  assert_eq!(api.amount_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
  assert_eq!(widget.open_count(), 0);
  assert_eq!(view.last_submit_enabled(), Some(true));
}

/// Aborts its flow the moment the attempt disables the submit control.
struct AbortOnStart {
  flow: OnceCell<Weak<BookingPaymentFlow>>,
  inner: Arc<RecordingView>,
}

impl FlowView for AbortOnStart {
  fn set_submit_enabled(&self, enabled: bool) {
    if !enabled {
      if let Some(flow) = self.flow.get().and_then(Weak::upgrade) {
        flow.abort();
      }
    }
    self.inner.set_submit_enabled(enabled);
  }

  fn show_progress(&self, state: FlowState) {
    self.inner.show_progress(state);
  }

  fn show_outcome(&self, notice: &Notice, result: Option<&BookingResult>) {
    self.inner.show_outcome(notice, result);
  }
}

#[tokio::test]
async fn abort_at_attempt_start_reaches_the_new_attempt() {
  let api = FakeApi::new();
  let widget = FakeWidget::paying("R1");
  let recording = RecordingView::new();
  let view = Arc::new(AbortOnStart {
    flow: OnceCell::new(),
    inner: recording.clone(),
  });
  let flow = Arc::new(BookingPaymentFlow::new(api.clone(), widget.clone(), view.clone(), test_config()).unwrap());
  view.flow.set(Arc::downgrade(&flow)).ok();

  let outcome = flow.submit(draft()).await.unwrap();

  assert!(matches!(outcome.error, Some(FlowError::Aborted)));
  assert_eq!(api.calls(), (0, 0, 0, 0));
  assert_eq!(widget.open_count(), 0);
  assert_eq!(recording.last_submit_enabled(), Some(true));
  assert!(!flow.is_in_flight());
}

#[tokio::test]
async fn retry_after_cancel_uses_a_fresh_reference() {
  let api = FakeApi::new();
  let widget = FakeWidget::new([WidgetScript::Cancel, WidgetScript::PayWith("R2".into())]);
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let cancelled = flow.submit(draft()).await.unwrap();
  assert_eq!(cancelled.state, FlowState::WidgetCancelled);

  let retried = flow.retry(draft()).await.unwrap();
  assert_eq!(retried.state, FlowState::BookingConfirmed);

  let opened = widget.opened.lock();
  assert_eq!(opened.len(), 2);
  assert_ne!(opened[0].reference, opened[1].reference);
}

#[tokio::test]
async fn retry_after_confirmation_is_refused() {
  let api = FakeApi::new();
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  flow.submit(draft()).await.unwrap();
  let retry = flow.retry(draft()).await;

  assert!(matches!(retry, Err(FlowError::AlreadyConfirmed)));
  assert_eq!(api.calls(), (1, 1, 1, 1));
}

#[tokio::test]
async fn incomplete_form_is_invalid_without_network() {
  let api = FakeApi::new();
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let form: FormFields = [("first_name", "Ada"), ("email", "ada@example.com")].into_iter().collect();
  let outcome = flow.submit_form(&form).await.unwrap();

  assert_eq!(outcome.state, FlowState::DraftInvalid);
  assert_eq!(api.calls(), (0, 0, 0, 0));
  assert_eq!(view.outcomes.lock().len(), 1);
  assert_eq!(view.last_submit_enabled(), Some(true));
}

#[tokio::test]
async fn complete_form_books() {
  let api = FakeApi::new();
  let widget = FakeWidget::paying("R1");
  let view = RecordingView::new();
  let flow = flow_with(&api, &widget, &view, test_config());

  let checkin = checkin_date().to_string();
  let checkout = (checkin_date() + chrono::Days::new(2)).to_string();
  let form: FormFields = [
    ("first_name", "Ada"),
    ("last_name", "Obi"),
    ("email", "ada@example.com"),
    ("phone", "08031234567"),
    ("modalCheckin", checkin.as_str()),
    ("modalCheckout", checkout.as_str()),
    ("roomType", "2"),
    ("modalGuests", "2"),
    ("modalRooms", "1"),
    ("modalBasePrice", "₦25,000.00"),
    ("modalTotalCost", "₦50,000.00"),
  ]
  .into_iter()
  .collect();
  let outcome = flow.submit_form(&form).await.unwrap();

  assert_eq!(outcome.state, FlowState::BookingConfirmed);
  assert_eq!(outcome.result.unwrap().room_type, "2");
}
