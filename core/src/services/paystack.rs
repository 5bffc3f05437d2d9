// stayflow/src/services/paystack.rs

//! Paystack inline checkout, bridged from its callback style to a future.
//!
//! Two SDK generations exist. The legacy one is `setup(options)` followed by
//! `openIframe()`, reporting through `callback` and `onClose`. The current one
//! is a constructed object whose `newTransaction(options)` reports through
//! `onSuccess` and `onCancel`. Whichever the host exposes is picked at
//! runtime, the current one first.

use crate::config::FlowConfig;
use crate::models::PaymentReference;
use crate::validation::ValidatedDraft;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomField {
  pub display_name: String,
  pub variable_name: String,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Metadata {
  pub custom_fields: Vec<CustomField>,
}

/// Options handed to the checkout widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
  pub key: String,
  pub email: String,
  /// Minor units (kobo).
  pub amount: i64,
  pub currency: String,
  #[serde(rename = "ref")]
  pub reference: String,
  pub metadata: Metadata,
}

impl CheckoutRequest {
  pub fn new(config: &FlowConfig, validated: &ValidatedDraft, reference: &PaymentReference) -> Self {
    Self {
      key: config.paystack_public_key.clone(),
      email: validated.email.clone(),
      amount: validated.amount_minor,
      currency: config.currency.clone(),
      reference: reference.to_string(),
      metadata: Metadata {
        custom_fields: vec![
          CustomField {
            display_name: "Phone Number".to_string(),
            variable_name: "phone_number".to_string(),
            value: validated.phone.clone(),
          },
          CustomField {
            display_name: "Full Name".to_string(),
            variable_name: "full_name".to_string(),
            value: validated.full_name.clone(),
          },
        ],
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetOutcome {
  /// Payment went through; `reference` is the one to verify.
  Completed { reference: String },
  /// The guest closed the widget.
  Cancelled,
}

#[derive(Debug, Error)]
pub enum WidgetError {
  #[error("Payment system not available. Please refresh the page and try again.")]
  Unavailable,

  #[error("Payment setup failed: {0}")]
  Setup(anyhow::Error),

  #[error("Payment window closed without reporting an outcome.")]
  Dropped,
}

/// What the SDK passes to its success callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderResponse {
  pub reference: Option<String>,
  /// Older responses carry the reference as `ref` instead.
  pub ref_alias: Option<String>,
}

pub type SuccessCallback = Box<dyn FnOnce(ProviderResponse) + Send>;
pub type CloseCallback = Box<dyn FnOnce() + Send>;

pub struct LegacySetup {
  pub request: CheckoutRequest,
  pub callback: SuccessCallback,
  pub on_close: CloseCallback,
}

pub trait LegacyInline: Send + Sync {
  fn setup(&self, options: LegacySetup) -> anyhow::Result<Box<dyn LegacyHandler>>;
}

pub trait LegacyHandler: Send {
  fn open_iframe(&mut self) -> anyhow::Result<()>;
}

pub struct TransactionOptions {
  pub request: CheckoutRequest,
  pub on_success: SuccessCallback,
  pub on_cancel: CloseCallback,
}

pub trait ModernInline: Send + Sync {
  fn new_transaction(&self, options: TransactionOptions) -> anyhow::Result<()>;
}

/// Whatever environment hosts the SDK, asked for the shapes it exposes.
pub trait PaystackHost: Send + Sync {
  fn modern(&self) -> Option<Arc<dyn ModernInline>>;
  fn legacy(&self) -> Option<Arc<dyn LegacyInline>>;
}

pub enum PaystackSdk {
  Modern(Arc<dyn ModernInline>),
  Legacy(Arc<dyn LegacyInline>),
}

impl PaystackSdk {
  pub fn detect(host: &dyn PaystackHost) -> Option<Self> {
    host
      .modern()
      .map(PaystackSdk::Modern)
      .or_else(|| host.legacy().map(PaystackSdk::Legacy))
  }

  fn kind(&self) -> &'static str {
    match self {
      PaystackSdk::Modern(_) => "modern",
      PaystackSdk::Legacy(_) => "legacy",
    }
  }
}

/// Opens a checkout and resolves once the guest pays or gives up.
#[async_trait]
pub trait PaymentWidget: Send + Sync {
  async fn open(&self, request: CheckoutRequest) -> Result<WidgetOutcome, WidgetError>;
}

pub struct PaystackWidget {
  host: Arc<dyn PaystackHost>,
}

impl PaystackWidget {
  pub fn new(host: Arc<dyn PaystackHost>) -> Self {
    Self { host }
  }
}

type OutcomeSlot = Arc<Mutex<Option<oneshot::Sender<WidgetOutcome>>>>;

/// Only the first callback to fire is delivered.
fn deliver(slot: &OutcomeSlot, outcome: WidgetOutcome) {
  match slot.lock().take() {
    Some(tx) => {
      let _ = tx.send(outcome);
    }
    None => warn!(?outcome, "Ignoring callback after the outcome was already reported."),
  }
}

fn callbacks(slot: OutcomeSlot, fallback_reference: String) -> (SuccessCallback, CloseCallback) {
  let success_slot = slot.clone();
  let on_success: SuccessCallback = Box::new(move |response: ProviderResponse| {
    let reference = response
      .reference
      .filter(|r| !r.trim().is_empty())
      .or(response.ref_alias.filter(|r| !r.trim().is_empty()))
      .unwrap_or(fallback_reference);
    deliver(&success_slot, WidgetOutcome::Completed { reference });
  });
  let on_close: CloseCallback = Box::new(move || deliver(&slot, WidgetOutcome::Cancelled));
  (on_success, on_close)
}

#[async_trait]
impl PaymentWidget for PaystackWidget {
  async fn open(&self, request: CheckoutRequest) -> Result<WidgetOutcome, WidgetError> {
    let sdk = PaystackSdk::detect(self.host.as_ref()).ok_or(WidgetError::Unavailable)?;
    info!(sdk = sdk.kind(), reference = %request.reference, "Opening Paystack checkout.");

    let (tx, rx) = oneshot::channel();
    let slot: OutcomeSlot = Arc::new(Mutex::new(Some(tx)));
    let (on_success, on_close) = callbacks(slot, request.reference.clone());

    match sdk {
      PaystackSdk::Modern(inline) => inline
        .new_transaction(TransactionOptions {
          request,
          on_success,
          on_cancel: on_close,
        })
        .map_err(WidgetError::Setup)?,
      PaystackSdk::Legacy(inline) => {
        let mut handler = inline
          .setup(LegacySetup {
            request,
            callback: on_success,
            on_close,
          })
          .map_err(WidgetError::Setup)?;
        handler.open_iframe().map_err(WidgetError::Setup)?;
      }
    }

    rx.await.map_err(|_| WidgetError::Dropped)
  }
}
