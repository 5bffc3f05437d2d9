// stayflow/src/services/api.rs

use super::error::ApiError;
use crate::models::{AmountAck, AvailabilityRequest, AvailabilityResponse, BookingResponse, BookingSubmission, VerificationResponse};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// The four server-side booking endpoints.
///
/// Implementations return application answers (including failure answers
/// such as `{ success: false, errors }`) as `Ok`, and reserve `Err` for
/// transport, status and decoding failures.
#[async_trait]
pub trait BookingApi: Send + Sync {
  async fn check_availability(&self, request: &AvailabilityRequest) -> Result<AvailabilityResponse, ApiError>;

  /// Registers the amount the server should expect the payment provider to report.
  async fn store_expected_amount(&self, amount: Decimal) -> Result<AmountAck, ApiError>;

  async fn verify_payment(&self, reference: &str) -> Result<VerificationResponse, ApiError>;

  async fn submit_booking(&self, submission: &BookingSubmission) -> Result<BookingResponse, ApiError>;
}
