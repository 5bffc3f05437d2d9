// demos/terminal_checkout/src/main.rs

mod errors;
mod terminal;

use crate::errors::{AppError, Result as AppResult};
use crate::terminal::{TerminalHost, TerminalView};
use stayflow::flow::check_availability;
use stayflow::pricing::{fill_form, RoomRate};
use stayflow::{
  AbortSignal, AvailabilityRequest, BookingDraft, BookingPaymentFlow, FlowConfig, FormFields, HttpBookingApi,
  PaystackWidget, TokenSources,
};
use std::sync::Arc;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  if let Err(e) = run().await {
    tracing::error!(error = %e, "Checkout failed.");
    return Err(e.into());
  }
  Ok(())
}

async fn run() -> AppResult<()> {
  let path = std::env::args().nth(1).ok_or(AppError::Usage)?;
  let raw = std::fs::read_to_string(&path).map_err(|source| AppError::FormFile {
    path: path.clone(),
    source,
  })?;
  let mut form: FormFields = serde_json::from_str(&raw)?;
  // Totals are recomputed from the rate, as the booking page does on every change.
  let rate = RoomRate::from_form(&form);
  match fill_form(&mut form, rate) {
    Some(quote) => println!("{} night(s), total {}", quote.nights, quote.total_display()),
    None => tracing::warn!("Selection incomplete; no total could be computed."),
  }

  let config = FlowConfig::from_env()?;
  let csrf = TokenSources {
    hidden_field: std::env::var("CSRF_TOKEN").ok(),
    meta_tag: None,
    cookies: std::env::var("BOOKING_COOKIES").ok(),
  }
  .resolve();
  if csrf.is_none() {
    tracing::warn!("No anti-forgery token configured; requests will be refused.");
  }

  let api = Arc::new(HttpBookingApi::new(config.clone(), csrf));

  // Same check the form runs before enabling its submit button.
  if let Ok(draft) = BookingDraft::from_form(&form) {
    let request = AvailabilityRequest::from_draft(&draft);
    let precheck = check_availability(api.as_ref(), &config, &request, &AbortSignal::new()).await;
    println!("Availability: {}", precheck.result.user_message());
    if !precheck.submit_enabled {
      return Ok(());
    }
  }

  let widget = Arc::new(PaystackWidget::new(Arc::new(TerminalHost)));
  let flow = Arc::new(BookingPaymentFlow::new(api, widget, Arc::new(TerminalView), config)?);

  let interrupt = {
    let flow = flow.clone();
    tokio::spawn(async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        flow.abort();
      }
    })
  };

  let outcome = flow.submit_form(&form).await?;
  interrupt.abort();

  if let Some(receipt) = outcome.receipt() {
    println!("\n{receipt}");
    let file = format!("receipt-{}.html", receipt.booking.booking_id);
    match std::fs::write(&file, receipt.to_html()) {
      Ok(()) => println!("Printable receipt written to {file}"),
      Err(e) => tracing::warn!(error = %e, %file, "Could not write receipt."),
    }
  } else if outcome.retry_available() {
    println!("Run again to retry with a new payment reference.");
  }
  Ok(())
}
