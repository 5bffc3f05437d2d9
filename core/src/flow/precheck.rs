// stayflow/src/flow/precheck.rs

//! Availability check run while the guest is still filling in the form.

use super::error::{FlowError, Operation};
use crate::config::FlowConfig;
use crate::models::{AvailabilityRequest, AvailabilityResult};
use crate::retry::{retry_with_backoff, AbortSignal};
use crate::services::BookingApi;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Precheck {
  pub result: AvailabilityResult,
  /// Whether the form's submit control should be enabled.
  pub submit_enabled: bool,
}

/// Asks the server whether the selection is bookable. Transport failures are
/// reported as a rejection carrying the user-facing message, never as `Err`.
#[instrument(skip_all, fields(room_type = %request.room_type))]
pub async fn check_availability(
  api: &dyn BookingApi,
  config: &FlowConfig,
  request: &AvailabilityRequest,
  abort: &AbortSignal,
) -> Precheck {
  let result = match retry_with_backoff(&config.retry, "precheck_availability", abort, || {
    api.check_availability(request)
  })
  .await
  {
    Ok(response) => AvailabilityResult::classify(response, &config.available_message),
    Err(err) => AvailabilityResult::Rejected {
      errors: vec![FlowError::from_api(Operation::AvailabilityCheck, err).user_message()],
    },
  };
  let submit_enabled = result.is_available();
  info!(submit_enabled, message = %result.user_message(), "Availability pre-check finished.");
  Precheck { result, submit_enabled }
}
