// stayflow/src/services/http.rs

use super::api::BookingApi;
use super::error::ApiError;
use crate::config::FlowConfig;
use crate::csrf::{CsrfToken, FORM_FIELD, HEADER_NAME};
use crate::models::payment::{StoreAmountRequest, VerifyRequest};
use crate::models::{
  AmountAck, ApplicationAnswer, AvailabilityRequest, AvailabilityResponse, BookingResponse, BookingSubmission,
  VerificationResponse,
};
use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// `BookingApi` over HTTP with the booking site's session conventions.
#[derive(Clone)]
pub struct HttpBookingApi {
  client: Client,
  config: FlowConfig,
  csrf: Option<CsrfToken>,
}

impl HttpBookingApi {
  pub fn new(config: FlowConfig, csrf: Option<CsrfToken>) -> Self {
    Self::with_client(Client::new(), config, csrf)
  }

  pub fn with_client(client: Client, config: FlowConfig, csrf: Option<CsrfToken>) -> Self {
    Self { client, config, csrf }
  }

  fn token(&self) -> Result<&CsrfToken, ApiError> {
    self.csrf.as_ref().ok_or(ApiError::MissingToken)
  }

  fn post(&self, path: &str, token: &CsrfToken) -> RequestBuilder {
    self
      .client
      .post(self.config.url(path))
      .header(HEADER_NAME, token.as_str())
      .header("X-Requested-With", "XMLHttpRequest")
  }

  fn form(fields: Vec<(&'static str, String)>, token: &CsrfToken) -> Form {
    fields
      .into_iter()
      .fold(Form::new(), |form, (name, value)| form.text(name, value))
      .text(FORM_FIELD, token.as_str().to_string())
  }
}

/// Reads a response body as `T`.
///
/// A 4xx whose body is a meaningful answer of the endpoint's shape is returned
/// as that answer, so callers see e.g. `{ status: "failed" }` on a 400.
async fn decode<T>(response: Response) -> Result<T, ApiError>
where
  T: DeserializeOwned + ApplicationAnswer,
{
  let status = response.status();
  if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
    return Err(ApiError::Unauthorized { status: status.as_u16() });
  }

  let body = response.text().await?;
  if status.is_success() {
    return serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()));
  }

  if status.is_client_error() {
    if let Ok(answer) = serde_json::from_str::<T>(&body) {
      if answer.is_meaningful() {
        debug!(status = status.as_u16(), "Client error carried an application answer.");
        return Ok(answer);
      }
    }
  }
  Err(ApiError::from_status(status.as_u16(), body))
}

#[async_trait]
impl BookingApi for HttpBookingApi {
  #[instrument(name = "BookingApi::check_availability", skip_all, fields(room_type = %request.room_type))]
  async fn check_availability(&self, request: &AvailabilityRequest) -> Result<AvailabilityResponse, ApiError> {
    let token = self.token()?;
    let response = self
      .post(&self.config.endpoints.availability, token)
      .multipart(Self::form(request.form_fields(), token))
      .send()
      .await?;
    decode(response).await
  }

  #[instrument(name = "BookingApi::store_expected_amount", skip(self))]
  async fn store_expected_amount(&self, amount: Decimal) -> Result<AmountAck, ApiError> {
    let token = self.token()?;
    let response = self
      .post(&self.config.endpoints.store_expected_amount, token)
      .json(&StoreAmountRequest { amount })
      .send()
      .await?;
    decode(response).await
  }

  #[instrument(name = "BookingApi::verify_payment", skip(self))]
  async fn verify_payment(&self, reference: &str) -> Result<VerificationResponse, ApiError> {
    let token = self.token()?;
    let response = self
      .post(&self.config.endpoints.verify_payment, token)
      .json(&VerifyRequest {
        reference: reference.to_string(),
      })
      .send()
      .await?;
    decode(response).await
  }

  #[instrument(
    name = "BookingApi::submit_booking",
    skip_all,
    fields(transaction_id = %submission.transaction_id)
  )]
  async fn submit_booking(&self, submission: &BookingSubmission) -> Result<BookingResponse, ApiError> {
    let token = self.token()?;
    let response = self
      .post(&self.config.endpoints.submit_booking, token)
      .multipart(Self::form(submission.form_fields(), token))
      .send()
      .await?;
    decode(response).await
  }
}
