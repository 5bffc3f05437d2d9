// stayflow/src/pricing.rs

//! Price and guest-count derivation for the booking form.
//!
//! The flow never recomputes a total; it charges what the form shows.
//! `fill_form` is how a caller keeps the shown values in step with the
//! selection before submitting.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use crate::models::FormFields;
use crate::validation::{parse_amount, ValidationError};

/// Display value used while the form is incomplete.
pub const NOT_AVAILABLE: &str = "N/A";

/// Nightly rate and per-room capacity of a room type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomRate {
  pub base_price: Decimal,
  pub capacity: u32,
}

impl RoomRate {
  /// Rate carried by the form itself: `modalBasePrice`, plus `roomCapacity`
  /// when the page exposes it (0 otherwise).
  pub fn from_form(form: &FormFields) -> Option<Self> {
    let base_price = parse_amount(form.get("modalBasePrice")?).ok()?;
    let capacity = form.get("roomCapacity").and_then(|c| c.parse().ok()).unwrap_or(0);
    Some(Self { base_price, capacity })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
  pub nights: u32,
  pub base_price: Decimal,
  pub total: Decimal,
}

impl Quote {
  pub fn base_price_display(&self) -> String {
    format_naira(Some(self.base_price))
  }

  pub fn total_display(&self) -> String {
    format_naira(Some(self.total))
  }
}

/// Whole nights between the dates, `None` unless checkout is after checkin.
pub fn nights(checkin: NaiveDate, checkout: NaiveDate) -> Option<u32> {
  let days = (checkout - checkin).num_days();
  if days <= 0 {
    return None;
  }
  u32::try_from(days).ok()
}

/// Total for `rooms` rooms over the stay. `None` while any input is missing or zero.
pub fn quote(rate: Option<RoomRate>, rooms: u32, checkin: Option<NaiveDate>, checkout: Option<NaiveDate>) -> Option<Quote> {
  let rate = rate.filter(|r| r.base_price > Decimal::ZERO)?;
  if rooms == 0 {
    return None;
  }
  let nights = nights(checkin?, checkout?)?;
  Some(Quote {
    nights,
    base_price: rate.base_price,
    total: rate.base_price * Decimal::from(rooms) * Decimal::from(nights),
  })
}

/// Guests implied by the room selection, `None` when either factor is zero.
pub fn guests_for(capacity: u32, rooms: u32) -> Option<u32> {
  if capacity == 0 || rooms == 0 {
    return None;
  }
  capacity.checked_mul(rooms)
}

/// `₦1234.00`, or `N/A` when there is nothing to show.
pub fn format_naira(amount: Option<Decimal>) -> String {
  match amount {
    Some(amount) => format!("₦{:.2}", amount.round_dp(2)),
    None => NOT_AVAILABLE.to_string(),
  }
}

/// Earliest selectable checkout for a check-in date.
pub fn min_checkout(checkin: NaiveDate) -> Option<NaiveDate> {
  checkin.checked_add_days(Days::new(1))
}

pub fn check_checkin(checkin: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
  if checkin < today {
    return Err(ValidationError::CheckinInPast);
  }
  Ok(())
}

fn form_date(form: &FormFields, name: &str) -> Option<NaiveDate> {
  form.get(name)?.parse().ok()
}

/// Recomputes the derived form fields for `rate`: a missing checkout becomes
/// the day after check-in, guests follow room capacity when it is known, and
/// both price fields are rewritten (`N/A` while the selection is incomplete).
/// Returns the quote the totals were taken from.
pub fn fill_form(form: &mut FormFields, rate: Option<RoomRate>) -> Option<Quote> {
  let checkin = form_date(form, "modalCheckin");
  if form_date(form, "modalCheckout").is_none() {
    if let Some(checkout) = checkin.and_then(min_checkout) {
      form.insert("modalCheckout", checkout.to_string());
    }
  }
  let checkout = form_date(form, "modalCheckout");

  let rooms = form
    .get("modalRooms")
    .or_else(|| form.get("rooms"))
    .and_then(|r| r.parse().ok())
    .unwrap_or(0);
  if let Some(guests) = rate.and_then(|r| guests_for(r.capacity, rooms)) {
    form.insert("modalGuests", guests.to_string());
  }

  let quote = quote(rate, rooms, checkin, checkout);
  form.insert("modalBasePrice", format_naira(rate.map(|r| r.base_price)));
  form.insert("modalTotalCost", format_naira(quote.map(|q| q.total)));
  quote
}
