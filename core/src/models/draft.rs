// stayflow/src/models/draft.rs

use crate::validation::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestIdentity {
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  /// As typed; normalised during validation.
  pub phone: String,
}

impl GuestIdentity {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name).trim().to_string()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayDates {
  pub checkin: NaiveDate,
  pub checkout: NaiveDate,
}

impl StayDates {
  pub fn nights(&self) -> i64 {
    (self.checkout - self.checkin).num_days()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSelection {
  pub room_type_id: String,
  /// Human-readable room type, shown on confirmations and receipts.
  pub room_type_label: String,
  pub rooms: u32,
  pub guests: u32,
}

/// Prices as displayed on the booking form, currency symbol included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
  pub base_price: String,
  pub total_cost: String,
}

/// Everything the guest entered, frozen at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
  pub guest: GuestIdentity,
  pub stay: StayDates,
  pub room: RoomSelection,
  pub pricing: Pricing,
  pub special_requests: Option<String>,
}

/// Raw field map of the booking form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormFields(BTreeMap<String, String>);

impl FormFields {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
    self.0.insert(name.into(), value.into());
    self
  }

  /// Trimmed value of `name`, `None` when absent or blank.
  pub fn get(&self, name: &str) -> Option<&str> {
    self.0.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
  }

  fn require(&self, name: &'static str) -> Result<&str, ValidationError> {
    self.get(name).ok_or(ValidationError::MissingField(name))
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

impl BookingDraft {
  /// Builds a draft from the booking form's field names.
  ///
  /// The room count is read from `modalRooms`, then `rooms`. The room type
  /// label falls back to the id when the form did not carry one.
  pub fn from_form(form: &FormFields) -> Result<Self, ValidationError> {
    let guest = GuestIdentity {
      first_name: form.require("first_name")?.to_string(),
      last_name: form.require("last_name")?.to_string(),
      email: form.require("email")?.to_string(),
      phone: form.require("phone")?.to_string(),
    };

    let checkin = parse_date("modalCheckin", form.require("modalCheckin")?)?;
    let checkout = parse_date("modalCheckout", form.require("modalCheckout")?)?;
    if checkout <= checkin {
      return Err(ValidationError::InvalidField {
        field: "modalCheckout",
        value: checkout.to_string(),
      });
    }

    let room_type_id = form.require("roomType")?.to_string();
    let room_type_label = form
      .get("roomTypeLabel")
      .map(str::to_string)
      .unwrap_or_else(|| room_type_id.clone());
    let rooms_raw = form
      .get("modalRooms")
      .or_else(|| form.get("rooms"))
      .ok_or(ValidationError::MissingField("modalRooms"))?;
    let rooms = parse_count("modalRooms", rooms_raw)?;
    let guests = parse_count("modalGuests", form.require("modalGuests")?)?;

    Ok(Self {
      guest,
      stay: StayDates { checkin, checkout },
      room: RoomSelection {
        room_type_id,
        room_type_label,
        rooms,
        guests,
      },
      pricing: Pricing {
        base_price: form.get("modalBasePrice").unwrap_or_default().to_string(),
        total_cost: form.require("modalTotalCost")?.to_string(),
      },
      special_requests: form.get("special_requests").map(str::to_string),
    })
  }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
  NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidField {
    field,
    value: value.to_string(),
  })
}

fn parse_count(field: &'static str, value: &str) -> Result<u32, ValidationError> {
  match value.parse::<u32>() {
    Ok(n) if n > 0 => Ok(n),
    _ => Err(ValidationError::InvalidField {
      field,
      value: value.to_string(),
    }),
  }
}
