//! Turns the active cart into a paid order.
//!
//! The charge and the finalization are two separate steps. Finalization runs
//! in one store transaction and only matches an order that is still active, so
//! at most one concurrent checkout can place a given order.

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    api::payments::{ChargeRequest, PaymentError, PaymentGateway},
    app::{error::AppError, middleware::CurrentUser},
    models::{AddressEntity, CreatePaymentEntity, FinalizeOrder, OrderEntity, PaymentEntity},
    services::cart,
    store::Store,
};

pub const REF_CODE_LEN: usize = 20;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Invalid data received")]
    MissingField(&'static str),

    #[error("You do not have an active order")]
    NoActiveOrder,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Your order total must be greater than zero")]
    ZeroTotal,

    #[error("This address does not exist")]
    AddressNotFound,

    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// The charge went through but the order could not be placed.
    #[error("order {order_id} was charged as {charge_id} but could not be finalized")]
    NotFinalized { order_id: i32, charge_id: String },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::NoActiveOrder | CheckoutError::AddressNotFound => {
                AppError::NotFound(err.to_string())
            }
            CheckoutError::MissingField(_) | CheckoutError::EmptyCart | CheckoutError::ZeroTotal => {
                AppError::BadRequest(err.to_string())
            }
            CheckoutError::Payment(err) => match err {
                PaymentError::Card(message) => AppError::PaymentDeclined(message),
                PaymentError::RateLimit => {
                    AppError::PaymentProcessorUnavailable("Rate limit error".into())
                }
                PaymentError::InvalidRequest => AppError::BadRequest("Invalid parameters".into()),
                PaymentError::Authentication => {
                    AppError::PaymentProcessorUnavailable("Not authenticated".into())
                }
                PaymentError::Connection(_) => {
                    AppError::PaymentProcessorUnavailable("Network error".into())
                }
                PaymentError::Processor => AppError::PaymentProcessorUnavailable(
                    "Something went wrong. You were not charged. Please try again.".into(),
                ),
                PaymentError::Unknown(_) => AppError::UnknownFailure,
            },
            CheckoutError::NotFinalized { .. } => AppError::UnknownFailure,
            CheckoutError::Store(err) => AppError::Other(err),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckoutRequest {
    pub stripe_token: Option<String>,
    pub billing_address_id: Option<i32>,
    pub shipping_address_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub order: OrderEntity,
    pub payment: PaymentEntity,
}

/// Order total in the smallest currency unit.
pub fn amount_in_cents(total: f64) -> i64 {
    (total * 100.0).round() as i64
}

pub fn idempotency_key(order_id: i32, token: &str) -> String {
    format!("order-{order_id}-{token}")
}

pub fn new_ref_code() -> String {
    Uuid::new_v4().simple().to_string()[..REF_CODE_LEN].to_string()
}

async fn resolve_address(
    store: &dyn Store,
    user_id: i32,
    id: i32,
) -> Result<AddressEntity, CheckoutError> {
    store
        .get_address(user_id, id)
        .await?
        .ok_or(CheckoutError::AddressNotFound)
}

/// Returns the processor customer to charge, creating one on first purchase.
async fn resolve_customer(
    store: &dyn Store,
    payments: &dyn PaymentGateway,
    user: &CurrentUser,
    token: &str,
) -> Result<String, CheckoutError> {
    let profile = store.get_or_create_profile(user.id).await?;

    if let Some(customer_id) = profile.stripe_customer_id.filter(|id| !id.is_empty()) {
        payments.attach_source(&customer_id, token).await?;
        return Ok(customer_id);
    }

    let customer_id = payments.create_customer(user.email.as_deref()).await?;
    store.set_stripe_customer_id(user.id, &customer_id).await?;
    payments.attach_source(&customer_id, token).await?;
    Ok(customer_id)
}

pub async fn checkout(
    store: &dyn Store,
    payments: &dyn PaymentGateway,
    currency: &str,
    user: &CurrentUser,
    request: CheckoutRequest,
) -> Result<PlacedOrder, CheckoutError> {
    let token = request
        .stripe_token
        .filter(|token| !token.trim().is_empty())
        .ok_or(CheckoutError::MissingField("stripeToken"))?;
    let billing_address_id = request
        .billing_address_id
        .ok_or(CheckoutError::MissingField("selectedBillingAddress"))?;
    let shipping_address_id = request
        .shipping_address_id
        .ok_or(CheckoutError::MissingField("selectedShippingAddress"))?;

    let order = store
        .find_active_order(user.id)
        .await?
        .ok_or(CheckoutError::NoActiveOrder)?;
    let summary = cart::summarize(store, vec![order])
        .await?
        .pop()
        .ok_or(CheckoutError::NoActiveOrder)?;
    if summary.lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let billing_address = resolve_address(store, user.id, billing_address_id).await?;
    let shipping_address = resolve_address(store, user.id, shipping_address_id).await?;

    let amount_cents = amount_in_cents(summary.total);
    if amount_cents <= 0 {
        return Err(CheckoutError::ZeroTotal);
    }

    let order_id = summary.order.id;
    let customer_id = resolve_customer(store, payments, user, &token)
        .await
        .inspect_err(|err| tracing::warn!("Checkout of order {} failed: {}", order_id, err))?;

    let charge = payments
        .charge(ChargeRequest {
            customer_id,
            amount_cents,
            currency: currency.to_string(),
            idempotency_key: idempotency_key(order_id, &token),
        })
        .await
        .inspect_err(|err| tracing::warn!("Charge for order {} rejected: {}", order_id, err))?;

    let finalize = FinalizeOrder {
        order_id,
        payment: CreatePaymentEntity {
            user_id: user.id,
            stripe_charge_id: charge.id.clone(),
            amount: summary.total,
        },
        billing_address_id: billing_address.id,
        shipping_address_id: shipping_address.id,
        ref_code: new_ref_code(),
        ordered_date: Utc::now(),
    };

    let not_finalized = || CheckoutError::NotFinalized {
        order_id,
        charge_id: charge.id.clone(),
    };
    let placed = match store.finalize_order(finalize).await {
        Ok(Some((order, payment))) => PlacedOrder { order, payment },
        Ok(None) => {
            tracing::error!(
                "Order {} was no longer active after charge {}",
                order_id,
                charge.id
            );
            return Err(not_finalized());
        }
        Err(err) => {
            tracing::error!(
                "Failed to finalize order {} after charge {}: {:?}",
                order_id,
                charge.id,
                err
            );
            return Err(not_finalized());
        }
    };

    tracing::info!(
        "Order {} placed by user {} for {:.2} (charge {})",
        placed.order.id,
        user.id,
        placed.payment.amount,
        charge.id
    );
    Ok(placed)
}
