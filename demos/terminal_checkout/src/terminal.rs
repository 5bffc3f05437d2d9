// demos/terminal_checkout/src/terminal.rs

//! Terminal stand-ins for the browser: a view that prints, and a checkout
//! "SDK" that asks on stdin whether the payment went through.

use stayflow::flow::{FlowView, Notice, Severity};
use stayflow::services::paystack::{LegacyInline, ModernInline, PaystackHost, ProviderResponse, TransactionOptions};
use stayflow::{BookingResult, FlowState};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

pub struct TerminalView;

impl FlowView for TerminalView {
  fn set_submit_enabled(&self, enabled: bool) {
    tracing::debug!(enabled, "Submit control toggled.");
  }

  fn show_progress(&self, state: FlowState) {
    println!("  .. {}", state.describe());
  }

  fn show_outcome(&self, notice: &Notice, result: Option<&BookingResult>) {
    let marker = match notice.severity {
      Severity::Success => "OK",
      Severity::Warning => "!!",
      Severity::Error => "XX",
    };
    println!("\n[{marker}] {}\n     {}", notice.title, notice.message);
    if let Some(result) = result {
      println!("     Booking ID: {}", result.booking_id);
    }
  }
}

/// Prompts on stdin from a separate thread and reports through the callbacks,
/// the way the inline checkout reports from the browser.
pub struct PromptCheckout;

impl ModernInline for PromptCheckout {
  fn new_transaction(&self, options: TransactionOptions) -> anyhow::Result<()> {
    let request = options.request;
    println!("\n=== Paystack checkout ===");
    println!("  email:     {}", request.email);
    println!("  amount:    {} {} (minor units)", request.amount, request.currency);
    println!("  reference: {}", request.reference);
    print!("Type 'pay' (optionally followed by a provider reference) or 'cancel': ");
    io::stdout().flush()?;

    let on_success = options.on_success;
    let on_cancel = options.on_cancel;
    std::thread::Builder::new().name("checkout-prompt".into()).spawn(move || {
      let mut line = String::new();
      let read = io::stdin().lock().read_line(&mut line);
      let mut words = line.split_whitespace();
      match (read, words.next()) {
        (Ok(_), Some(cmd)) if cmd.eq_ignore_ascii_case("pay") => on_success(ProviderResponse {
          reference: words.next().map(str::to_string),
          ref_alias: None,
        }),
        _ => on_cancel(),
      }
    })?;
    Ok(())
  }
}

pub struct TerminalHost;

impl PaystackHost for TerminalHost {
  fn modern(&self) -> Option<Arc<dyn ModernInline>> {
    Some(Arc::new(PromptCheckout))
  }

  fn legacy(&self) -> Option<Arc<dyn LegacyInline>> {
    None
  }
}
