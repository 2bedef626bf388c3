//! Stripe REST client.
//!
//! Requests are form-encoded and authenticated with the secret key as a bearer
//! token. Charges carry an `Idempotency-Key` so a retried checkout cannot
//! capture twice.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    api::payments::{Charge, ChargeRequest, PaymentError, PaymentGateway},
    app::config::StripeConfig,
};

pub const DEFAULT_DECLINE_MESSAGE: &str = "Your card was declined.";

pub struct StripeGateway {
    client: Client,
    api_base: String,
    secret_key: String,
}

#[derive(Deserialize)]
struct CustomerRes {
    id: String,
}

#[derive(Deserialize)]
struct ChargeRes {
    id: String,
    amount: i64,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: StripeError,
}

#[derive(Deserialize)]
struct StripeError {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(client: Client, config: &StripeConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.secret_key)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, PaymentError> {
        let response = request
            .send()
            .await
            .map_err(|err| PaymentError::Connection(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| PaymentError::Connection(err.to_string()))?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|err| PaymentError::Unknown(err.to_string()))
    }
}

/// Maps a failed Stripe response onto a [`PaymentError`] using the HTTP status
/// and the `error.type` field of the body.
pub fn classify_error(status: StatusCode, body: &str) -> PaymentError {
    let error = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error);
    let kind = error.as_ref().and_then(|error| error.kind.as_deref());
    let message = error.as_ref().and_then(|error| error.message.clone());

    if kind == Some("card_error") || status == StatusCode::PAYMENT_REQUIRED {
        return PaymentError::Card(message.unwrap_or_else(|| DEFAULT_DECLINE_MESSAGE.to_string()));
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => PaymentError::RateLimit,
        StatusCode::UNAUTHORIZED => PaymentError::Authentication,
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => PaymentError::InvalidRequest,
        _ if kind == Some("invalid_request_error") => PaymentError::InvalidRequest,
        _ if status.is_client_error() || status.is_server_error() => PaymentError::Processor,
        _ => PaymentError::Unknown(format!("HTTP {status}")),
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_customer(&self, email: Option<&str>) -> Result<String, PaymentError> {
        let mut form: Vec<(&str, &str)> = Vec::new();
        if let Some(email) = email {
            form.push(("email", email));
        }

        let customer: CustomerRes = Self::send(self.post("/v1/customers").form(&form)).await?;
        tracing::debug!("Created Stripe customer {}", customer.id);
        Ok(customer.id)
    }

    async fn attach_source(&self, customer_id: &str, token: &str) -> Result<(), PaymentError> {
        let path = format!("/v1/customers/{customer_id}/sources");
        let _: serde_json::Value =
            Self::send(self.post(&path).form(&[("source", token)])).await?;
        Ok(())
    }

    async fn charge(&self, request: ChargeRequest) -> Result<Charge, PaymentError> {
        let amount = request.amount_cents.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", request.currency.as_str()),
            ("customer", request.customer_id.as_str()),
        ];

        let charge: ChargeRes = Self::send(
            self.post("/v1/charges")
                .header("Idempotency-Key", &request.idempotency_key)
                .form(&form),
        )
        .await?;

        Ok(Charge {
            id: charge.id,
            amount: charge.amount,
        })
    }
}
