// stayflow/src/models/payment.rs

use super::{wire, ApplicationAnswer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_ISSUED_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Correlation token for one payment attempt: `HOTEL-BKG-<unix millis>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentReference(String);

impl PaymentReference {
  pub const PREFIX: &'static str = "HOTEL-BKG-";

  /// Issues a fresh reference. Timestamps are bumped when two references are
  /// issued within the same millisecond, so no two are ever equal.
  pub fn generate() -> Self {
    let now = chrono::Utc::now().timestamp_millis();
    let previous = LAST_ISSUED_MILLIS
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
      .unwrap_or(now);
    Self(format!("{}{}", Self::PREFIX, now.max(previous + 1)))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for PaymentReference {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

/// One payment attempt, from amount registration to verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
  pub reference: PaymentReference,
  /// Amount registered with the server, in major units.
  pub amount: Decimal,
  pub amount_minor: i64,
  /// Reference reported by the checkout widget, when it reported one.
  pub provider_reference: Option<String>,
  pub transaction_id: Option<String>,
}

impl PaymentSession {
  pub fn new(amount: Decimal, amount_minor: i64) -> Self {
    Self {
      reference: PaymentReference::generate(),
      amount,
      amount_minor,
      provider_reference: None,
      transaction_id: None,
    }
  }

  /// The reference to verify: the provider's when present, otherwise ours.
  pub fn verification_reference(&self) -> &str {
    self.provider_reference.as_deref().unwrap_or(self.reference.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreAmountRequest {
  #[serde(with = "rust_decimal::serde::float")]
  pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AmountAck {
  #[serde(default)]
  pub success: bool,
  #[serde(default, deserialize_with = "wire::messages")]
  pub errors: Vec<String>,
}

impl ApplicationAnswer for AmountAck {
  fn is_meaningful(&self) -> bool {
    self.success || !self.errors.is_empty()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyRequest {
  pub reference: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VerificationResponse {
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default, deserialize_with = "wire::identifier")]
  pub transaction_id: Option<String>,
}

impl VerificationResponse {
  pub const SUCCESS: &'static str = "success";

  pub fn is_success(&self) -> bool {
    self.status == Self::SUCCESS
  }
}

impl ApplicationAnswer for VerificationResponse {
  fn is_meaningful(&self) -> bool {
    !self.status.is_empty()
  }
}
