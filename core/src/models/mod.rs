// stayflow/src/models/mod.rs

//! Booking data as it moves through one attempt: draft, availability answer,
//! payment session, and the final booking result. Also the JSON shapes the
//! booking endpoints answer with.

pub mod availability;
pub mod booking;
pub mod draft;
pub mod payment;

pub use availability::{AvailabilityRequest, AvailabilityResponse, AvailabilityResult};
pub use booking::{BookingResponse, BookingResult, BookingSubmission};
pub use draft::{BookingDraft, FormFields, GuestIdentity, Pricing, RoomSelection, StayDates};
pub use payment::{AmountAck, PaymentReference, PaymentSession, VerificationResponse};

/// Implemented by endpoint responses so the HTTP client can tell an
/// application answer carried on a 4xx apart from an unrelated error page.
pub trait ApplicationAnswer {
  fn is_meaningful(&self) -> bool;
}

pub(crate) mod wire {
  use serde::{Deserialize, Deserializer};
  use serde_json::Value;

  /// `errors` arrives as a list, a single string, or not at all.
  pub fn messages<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Option::<Value>::deserialize(deserializer)? {
      None | Some(Value::Null) => Vec::new(),
      Some(Value::String(s)) if s.trim().is_empty() => Vec::new(),
      Some(Value::String(s)) => vec![s],
      Some(Value::Array(items)) => items.into_iter().map(value_to_text).collect(),
      Some(other) => vec![value_to_text(other)],
    })
  }

  /// Identifiers arrive as numbers or strings.
  pub fn identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Option::<Value>::deserialize(deserializer)? {
      None | Some(Value::Null) => None,
      Some(Value::String(s)) if s.trim().is_empty() => None,
      Some(other) => Some(value_to_text(other)),
    })
  }

  fn value_to_text(value: Value) -> String {
    match value {
      Value::String(s) => s,
      other => other.to_string(),
    }
  }
}
