// stayflow/src/validation.rs

//! Field checks run on a draft before anything charge-related happens.

use crate::models::BookingDraft;
use crate::pricing::check_checkin;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use thiserror::Error;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{10,15}$").unwrap());

/// Renderings of the naira sign seen in displayed totals.
const CURRENCY_MARKS: [&str; 4] = ["₦", "&#8358;", "&#x20A6;", "&#x20a6;"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
  #[error("Please fill in the {0} field.")]
  MissingField(&'static str),

  #[error("Invalid value for {field}: {value}")]
  InvalidField { field: &'static str, value: String },

  #[error("Invalid total cost: {raw}")]
  InvalidAmount { raw: String },

  #[error("Please enter a valid email address.")]
  InvalidEmail { value: String },

  #[error("Please enter a valid phone number (e.g., +2341234567890).")]
  InvalidPhone { normalized: String },

  #[error("Check-in date cannot be in the past.")]
  CheckinInPast,
}

/// Parses a displayed total such as `₦150,000.00` into a positive amount.
pub fn parse_amount(raw: &str) -> Result<Decimal, ValidationError> {
  let mut cleaned = raw.to_string();
  for mark in CURRENCY_MARKS {
    cleaned = cleaned.replace(mark, "");
  }
  cleaned.retain(|c| c != ',' && !c.is_whitespace());

  let invalid = || ValidationError::InvalidAmount { raw: raw.to_string() };
  let amount = Decimal::from_str(&cleaned).map_err(|_| invalid())?;
  if amount <= Decimal::ZERO {
    return Err(invalid());
  }
  Ok(amount)
}

/// Converts a major-unit amount to minor units (kobo), rounding half away from zero.
pub fn to_minor_units(amount: Decimal) -> Result<i64, ValidationError> {
  let minor = (amount * Decimal::ONE_HUNDRED).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
  i64::try_from(minor).map_err(|_| ValidationError::InvalidAmount { raw: amount.to_string() })
}

pub fn is_valid_email(email: &str) -> bool {
  EMAIL_RE.is_match(email)
}

/// Replaces a leading local `0` with `+<calling_code>`. Other input is only trimmed.
pub fn normalize_phone(raw: &str, calling_code: &str) -> String {
  let trimmed = raw.trim();
  match trimmed.strip_prefix('0') {
    Some(rest) => format!("+{calling_code}{rest}"),
    None => trimmed.to_string(),
  }
}

pub fn is_valid_phone(phone: &str) -> bool {
  PHONE_RE.is_match(phone)
}

/// Values derived while validating a draft, carried into later steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
  pub amount: Decimal,
  pub amount_minor: i64,
  pub email: String,
  pub phone: String,
  pub full_name: String,
}

/// Checks the draft as of `today`. A check-in before `today` is refused.
pub fn validate_draft(draft: &BookingDraft, calling_code: &str, today: NaiveDate) -> Result<ValidatedDraft, ValidationError> {
  check_checkin(draft.stay.checkin, today)?;

  let amount = parse_amount(&draft.pricing.total_cost)?;
  let amount_minor = to_minor_units(amount)?;

  let email = draft.guest.email.trim().to_string();
  if !is_valid_email(&email) {
    return Err(ValidationError::InvalidEmail { value: email });
  }

  let phone = normalize_phone(&draft.guest.phone, calling_code);
  if !is_valid_phone(&phone) {
    return Err(ValidationError::InvalidPhone { normalized: phone });
  }

  Ok(ValidatedDraft {
    amount,
    amount_minor,
    email,
    phone,
    full_name: draft.guest.full_name(),
  })
}
