// stayflow/src/receipt.rs

//! Printable receipt for a confirmed booking.

use crate::models::BookingResult;
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
  pub booking: BookingResult,
  pub printed_at: NaiveDateTime,
}

impl Receipt {
  pub fn new(booking: BookingResult, printed_at: NaiveDateTime) -> Self {
    Self { booking, printed_at }
  }

  /// Receipt stamped with the local time.
  pub fn now(booking: BookingResult) -> Self {
    Self::new(booking, chrono::Local::now().naive_local())
  }

  fn lines(&self) -> Vec<(&'static str, String)> {
    let b = &self.booking;
    vec![
      ("Booking ID", b.booking_id.clone()),
      ("Guest Name", b.guest_name.clone()),
      ("Email", b.email.clone()),
      ("Phone", b.phone.clone()),
      ("Check-in", b.checkin.clone()),
      ("Check-out", b.checkout.clone()),
      ("Room Type", b.room_type.clone()),
      ("Guests", b.guests.to_string()),
      ("Rooms", b.rooms.to_string()),
      ("Total Cost", b.total_cost.clone()),
      ("Transaction ID", b.transaction_id.clone()),
      ("Date", self.printed_at.format("%Y-%m-%d %H:%M:%S").to_string()),
    ]
  }

  /// Standalone HTML page. Every value is escaped.
  pub fn to_html(&self) -> String {
    let mut html = String::from(concat!(
      "<html>\n<head>\n<title>Booking Receipt</title>\n<style>\n",
      "body { font-family: Arial, sans-serif; padding: 20px; }\n",
      ".receipt { max-width: 600px; margin: auto; border: 1px solid #ccc; padding: 20px; }\n",
      ".receipt h2 { text-align: center; }\n",
      ".receipt .label { font-weight: bold; }\n",
      "</style>\n</head>\n<body>\n<div class=\"receipt\">\n<h2>Hotel Booking Receipt</h2>\n",
    ));
    for (label, value) in self.lines() {
      html.push_str(&format!(
        "<p><span class=\"label\">{label}:</span> {}</p>\n",
        escape_html(&value)
      ));
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
  }
}

impl fmt::Display for Receipt {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Hotel Booking Receipt")?;
    for (label, value) in self.lines() {
      writeln!(f, "{label:<15} {value}")?;
    }
    Ok(())
  }
}

fn escape_html(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  for c in value.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      other => out.push(other),
    }
  }
  out
}
