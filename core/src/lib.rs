// stayflow/src/lib.rs

//! Stayflow: the client side of a hotel booking and payment sequence.
//!
//! A booking attempt runs as a pipeline of named async steps:
//!  - re-check availability with the server,
//!  - validate the draft (amount, email, phone),
//!  - register the expected amount,
//!  - open the Paystack checkout widget,
//!  - verify the payment server-side,
//!  - submit the booking and render a receipt.
//!
//! Network steps are wrapped in a capped exponential-backoff retry with a
//! per-attempt timeout. The server endpoints, the checkout widget and the UI
//! are reached through the `BookingApi`, `PaymentWidget` and `FlowView`
//! traits.

pub mod config;
pub mod core;
pub mod csrf;
pub mod error;
pub mod flow;
pub mod models;
pub mod pipeline;
pub mod pricing;
pub mod receipt;
pub mod retry;
pub mod services;
pub mod validation;

// --- Re-exports for the Public API ---

pub use crate::core::{ContextData, Handler, PipelineOutcome, SkipCondition, StepControl, StepDef};
pub use crate::error::{PipelineError, PipelineResult};
pub use crate::pipeline::Pipeline;

pub use crate::config::{ConfigError, EndpointPaths, FlowConfig};
pub use crate::csrf::{CsrfToken, TokenSources};
pub use crate::flow::{
  BookingPaymentFlow, ErrorCategory, FlowError, FlowOutcome, FlowState, FlowView, Notice, Precheck, Severity,
  TracingView,
};
pub use crate::models::{
  AvailabilityRequest, AvailabilityResult, BookingDraft, BookingResult, FormFields, PaymentReference, PaymentSession,
};
pub use crate::receipt::Receipt;
pub use crate::retry::{retry_with_backoff, AbortSignal, RetryPolicy};
pub use crate::services::{
  ApiError, BookingApi, CheckoutRequest, HttpBookingApi, PaymentWidget, PaystackWidget, WidgetError, WidgetOutcome,
};
pub use crate::validation::{validate_draft, ValidatedDraft, ValidationError};
