use async_trait::async_trait;
use thiserror::Error;

/// Failure classes reported by a payment processor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// The card was declined. Carries the processor's message for the user.
    #[error("{0}")]
    Card(String),

    #[error("rate limited by the payment processor")]
    RateLimit,

    #[error("invalid request to the payment processor")]
    InvalidRequest,

    #[error("payment processor rejected our credentials")]
    Authentication,

    #[error("could not reach the payment processor: {0}")]
    Connection(String),

    #[error("payment processor error")]
    Processor,

    #[error("unexpected payment processor response: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    pub id: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    pub customer_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub idempotency_key: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a processor customer and returns its id.
    async fn create_customer(&self, email: Option<&str>) -> Result<String, PaymentError>;

    /// Attaches a tokenized card to an existing customer.
    async fn attach_source(&self, customer_id: &str, token: &str) -> Result<(), PaymentError>;

    async fn charge(&self, request: ChargeRequest) -> Result<Charge, PaymentError>;
}
