// stayflow/src/config.rs

use crate::retry::RetryPolicy;
use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Configuration error: {0}")]
pub struct ConfigError(pub String);

/// Relative paths of the four booking endpoints, joined onto `FlowConfig::base_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPaths {
  pub availability: String,
  pub store_expected_amount: String,
  pub verify_payment: String,
  pub submit_booking: String,
}

impl Default for EndpointPaths {
  fn default() -> Self {
    Self {
      availability: "/hotel/check-availability".to_string(),
      store_expected_amount: "/store-expected-amount".to_string(),
      verify_payment: "/verify-payment".to_string(),
      submit_booking: "/submit-booking".to_string(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct FlowConfig {
  pub base_url: String,
  pub endpoints: EndpointPaths,

  pub paystack_public_key: String,
  /// ISO currency code handed to the checkout widget.
  pub currency: String,
  /// Calling code (digits only) substituted for a leading local `0` in phone numbers.
  pub country_calling_code: String,
  /// The exact availability message that means "bookable".
  pub available_message: String,

  pub retry: RetryPolicy,
  /// When false the availability re-check step is skipped.
  pub recheck_availability: bool,
}

impl Default for FlowConfig {
  fn default() -> Self {
    Self {
      base_url: "http://127.0.0.1:8000".to_string(),
      endpoints: EndpointPaths::default(),
      paystack_public_key: String::new(),
      currency: "NGN".to_string(),
      country_calling_code: "234".to_string(),
      available_message: "Room available".to_string(),
      retry: RetryPolicy::default(),
      recheck_availability: true,
    }
  }
}

impl FlowConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenv().ok();

    let defaults = Self::default();
    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let base_url = get_env("BOOKING_BASE_URL").unwrap_or(defaults.base_url);
    let endpoints = EndpointPaths {
      availability: get_env("AVAILABILITY_PATH").unwrap_or(defaults.endpoints.availability),
      store_expected_amount: get_env("STORE_AMOUNT_PATH").unwrap_or(defaults.endpoints.store_expected_amount),
      verify_payment: get_env("VERIFY_PAYMENT_PATH").unwrap_or(defaults.endpoints.verify_payment),
      submit_booking: get_env("SUBMIT_BOOKING_PATH").unwrap_or(defaults.endpoints.submit_booking),
    };

    let paystack_public_key = get_env("PAYSTACK_PUBLIC_KEY")
      .ok_or_else(|| ConfigError("Missing environment variable 'PAYSTACK_PUBLIC_KEY'".to_string()))?;
    let currency = get_env("PAYMENT_CURRENCY").unwrap_or(defaults.currency);
    let country_calling_code = get_env("COUNTRY_CALLING_CODE").unwrap_or(defaults.country_calling_code);
    if !country_calling_code.chars().all(|c| c.is_ascii_digit()) {
      return Err(ConfigError(format!(
        "Invalid COUNTRY_CALLING_CODE '{}': digits only",
        country_calling_code
      )));
    }
    let available_message = get_env("AVAILABLE_MESSAGE").unwrap_or(defaults.available_message);

    let max_attempts = parse_or("RETRY_MAX_ATTEMPTS", get_env("RETRY_MAX_ATTEMPTS"), defaults.retry.max_attempts)?;
    if max_attempts == 0 {
      return Err(ConfigError("RETRY_MAX_ATTEMPTS must be at least 1".to_string()));
    }
    let initial_delay_ms = parse_or(
      "RETRY_INITIAL_DELAY_MS",
      get_env("RETRY_INITIAL_DELAY_MS"),
      defaults.retry.initial_delay.as_millis() as u64,
    )?;
    let timeout_secs = parse_or(
      "REQUEST_TIMEOUT_SECS",
      get_env("REQUEST_TIMEOUT_SECS"),
      defaults.retry.attempt_timeout.as_secs(),
    )?;
    let recheck_availability = parse_or(
      "RECHECK_AVAILABILITY",
      get_env("RECHECK_AVAILABILITY"),
      defaults.recheck_availability,
    )?;

    tracing::info!(%base_url, %currency, max_attempts, "Booking flow configuration loaded.");

    Ok(Self {
      base_url,
      endpoints,
      paystack_public_key,
      currency,
      country_calling_code,
      available_message,
      retry: RetryPolicy {
        max_attempts,
        initial_delay: Duration::from_millis(initial_delay_ms),
        attempt_timeout: Duration::from_secs(timeout_secs),
        ..defaults.retry
      },
      recheck_availability,
    })
  }

  /// Joins an endpoint path onto the base URL.
  pub fn url(&self, path: &str) -> String {
    format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
  }
}

fn parse_or<T>(var_name: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    None => Ok(default),
    Some(value) => value
      .trim()
      .parse::<T>()
      .map_err(|e| ConfigError(format!("Invalid {} value '{}': {}", var_name, value, e))),
  }
}
