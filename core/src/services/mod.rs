// stayflow/src/services/mod.rs

//! Collaborators reached over the network or through third-party SDKs.

pub mod api;
pub mod error;
pub mod http;
pub mod paystack;

pub use api::BookingApi;
pub use error::ApiError;
pub use http::HttpBookingApi;
pub use paystack::{CheckoutRequest, PaymentWidget, PaystackWidget, WidgetError, WidgetOutcome};
