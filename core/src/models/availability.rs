// stayflow/src/models/availability.rs

use super::draft::BookingDraft;
use super::{wire, ApplicationAnswer};
use serde::{Deserialize, Serialize};

/// Form body of the availability endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityRequest {
  pub checkin: String,
  pub checkout: String,
  pub room_type: String,
  pub rooms: u32,
  pub guest: u32,
}

impl AvailabilityRequest {
  pub fn from_draft(draft: &BookingDraft) -> Self {
    Self {
      checkin: draft.stay.checkin.to_string(),
      checkout: draft.stay.checkout.to_string(),
      room_type: draft.room.room_type_id.clone(),
      rooms: draft.room.rooms,
      guest: draft.room.guests,
    }
  }

  pub fn form_fields(&self) -> Vec<(&'static str, String)> {
    vec![
      ("checkin", self.checkin.clone()),
      ("checkout", self.checkout.clone()),
      ("room_type", self.room_type.clone()),
      ("rooms", self.rooms.to_string()),
      ("guest", self.guest.to_string()),
    ]
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AvailabilityResponse {
  #[serde(default)]
  pub availability_message: Option<String>,
  #[serde(default, deserialize_with = "wire::messages")]
  pub errors: Vec<String>,
}

impl ApplicationAnswer for AvailabilityResponse {
  fn is_meaningful(&self) -> bool {
    self.availability_message.is_some() || !self.errors.is_empty()
  }
}

/// Shown when the server declines without saying why.
pub const UNAVAILABLE_FALLBACK: &str = "Room not available for the selected dates.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityResult {
  Available { message: String },
  Unavailable { message: String },
  Rejected { errors: Vec<String> },
}

impl AvailabilityResult {
  /// A non-empty error list wins over any message; otherwise only an exact
  /// match of `available_message` counts as available.
  pub fn classify(response: AvailabilityResponse, available_message: &str) -> Self {
    if !response.errors.is_empty() {
      return AvailabilityResult::Rejected {
        errors: response.errors,
      };
    }
    match response.availability_message {
      Some(message) if message == available_message => AvailabilityResult::Available { message },
      Some(message) if !message.trim().is_empty() => AvailabilityResult::Unavailable { message },
      _ => AvailabilityResult::Unavailable {
        message: UNAVAILABLE_FALLBACK.to_string(),
      },
    }
  }

  pub fn is_available(&self) -> bool {
    matches!(self, AvailabilityResult::Available { .. })
  }

  /// The text shown to the guest: the message verbatim, or the errors joined.
  pub fn user_message(&self) -> String {
    match self {
      AvailabilityResult::Available { message } | AvailabilityResult::Unavailable { message } => message.clone(),
      AvailabilityResult::Rejected { errors } => errors.join(", "),
    }
  }
}
