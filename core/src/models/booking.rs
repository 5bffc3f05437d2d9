// stayflow/src/models/booking.rs

use super::draft::BookingDraft;
use super::{wire, ApplicationAnswer};
use crate::validation::ValidatedDraft;
use serde::{Deserialize, Serialize};

/// Form body posted to the booking endpoint once payment is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingSubmission {
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub phone: String,
  pub checkin: String,
  pub checkout: String,
  pub room_type: String,
  pub guests: u32,
  pub rooms: u32,
  pub base_price: String,
  pub total_cost: String,
  pub special_requests: String,
  pub transaction_id: String,
  pub payment_status: String,
}

impl BookingSubmission {
  pub const PAID: &'static str = "success";

  pub fn new(draft: &BookingDraft, validated: &ValidatedDraft, transaction_id: impl Into<String>) -> Self {
    Self {
      first_name: draft.guest.first_name.clone(),
      last_name: draft.guest.last_name.clone(),
      email: validated.email.clone(),
      phone: validated.phone.clone(),
      checkin: draft.stay.checkin.to_string(),
      checkout: draft.stay.checkout.to_string(),
      room_type: draft.room.room_type_id.clone(),
      guests: draft.room.guests,
      rooms: draft.room.rooms,
      base_price: draft.pricing.base_price.clone(),
      total_cost: draft.pricing.total_cost.clone(),
      special_requests: draft.special_requests.clone().unwrap_or_default(),
      transaction_id: transaction_id.into(),
      payment_status: Self::PAID.to_string(),
    }
  }

  /// Field names as the booking form posts them.
  pub fn form_fields(&self) -> Vec<(&'static str, String)> {
    vec![
      ("first_name", self.first_name.clone()),
      ("last_name", self.last_name.clone()),
      ("email", self.email.clone()),
      ("phone", self.phone.clone()),
      ("modalCheckin", self.checkin.clone()),
      ("modalCheckout", self.checkout.clone()),
      ("roomType", self.room_type.clone()),
      ("modalGuests", self.guests.to_string()),
      ("modalRooms", self.rooms.to_string()),
      ("modalBasePrice", self.base_price.clone()),
      ("modalTotalCost", self.total_cost.clone()),
      ("special_requests", self.special_requests.clone()),
      ("transaction_id", self.transaction_id.clone()),
      ("payment_status", self.payment_status.clone()),
    ]
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookingResponse {
  #[serde(default)]
  pub success: bool,
  #[serde(default, deserialize_with = "wire::identifier")]
  pub booking_id: Option<String>,
  #[serde(default, deserialize_with = "wire::messages")]
  pub errors: Vec<String>,
}

impl ApplicationAnswer for BookingResponse {
  fn is_meaningful(&self) -> bool {
    self.success || !self.errors.is_empty()
  }
}

/// A confirmed booking, as shown on the confirmation and receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingResult {
  pub booking_id: String,
  pub guest_name: String,
  pub email: String,
  pub phone: String,
  pub checkin: String,
  pub checkout: String,
  pub room_type: String,
  pub guests: u32,
  pub rooms: u32,
  pub total_cost: String,
  pub transaction_id: String,
  pub reference: String,
}

impl BookingResult {
  pub fn new(draft: &BookingDraft, submission: &BookingSubmission, booking_id: String, reference: String) -> Self {
    Self {
      booking_id,
      guest_name: draft.guest.full_name(),
      email: submission.email.clone(),
      phone: submission.phone.clone(),
      checkin: submission.checkin.clone(),
      checkout: submission.checkout.clone(),
      room_type: draft.room.room_type_label.clone(),
      guests: submission.guests,
      rooms: submission.rooms,
      total_cost: submission.total_cost.clone(),
      transaction_id: submission.transaction_id.clone(),
      reference,
    }
  }
}
