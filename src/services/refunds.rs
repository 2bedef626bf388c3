use thiserror::Error;

use crate::{
    app::error::AppError,
    models::{CreateRefundEntity, RefundEntity},
    store::Store,
};

#[derive(Debug, Error)]
pub enum RefundError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("This order does not exist")]
    OrderNotFound,

    #[error("A refund has already been requested for this order")]
    AlreadyRequested,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<RefundError> for AppError {
    fn from(err: RefundError) -> Self {
        match err {
            RefundError::MissingField(_) | RefundError::AlreadyRequested => {
                AppError::BadRequest(err.to_string())
            }
            RefundError::OrderNotFound => AppError::NotFound(err.to_string()),
            RefundError::Store(err) => AppError::Other(err),
        }
    }
}

/// Files a refund request against one of the user's placed orders.
pub async fn request_refund(
    store: &dyn Store,
    user_id: i32,
    ref_code: &str,
    reason: &str,
    email: &str,
) -> Result<RefundEntity, RefundError> {
    let ref_code = ref_code.trim();
    let reason = reason.trim();
    let email = email.trim();
    if ref_code.is_empty() {
        return Err(RefundError::MissingField("ref_code"));
    }
    if reason.is_empty() {
        return Err(RefundError::MissingField("reason"));
    }
    if email.is_empty() {
        return Err(RefundError::MissingField("email"));
    }

    let order = store
        .find_placed_order_by_ref_code(user_id, ref_code)
        .await?
        .ok_or(RefundError::OrderNotFound)?;
    if order.refund_requested {
        return Err(RefundError::AlreadyRequested);
    }

    let refund = store
        .create_refund(CreateRefundEntity {
            order_id: order.id,
            reason: reason.to_string(),
            email: email.to_string(),
        })
        .await?
        .ok_or(RefundError::AlreadyRequested)?;

    tracing::info!("Refund {} requested for order {}", refund.id, order.id);
    Ok(refund)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        models::{CreatePaymentEntity, FinalizeOrder},
        store::memory::MemoryStore,
    };

    async fn placed_order(store: &MemoryStore, user_id: i32, ref_code: &str) -> i32 {
        let order = store.create_active_order(user_id).await.unwrap();
        store
            .finalize_order(FinalizeOrder {
                order_id: order.id,
                payment: CreatePaymentEntity {
                    user_id,
                    stripe_charge_id: "ch_1".into(),
                    amount: 10.0,
                },
                billing_address_id: 1,
                shipping_address_id: 1,
                ref_code: ref_code.into(),
                ordered_date: Utc::now(),
            })
            .await
            .unwrap()
            .unwrap();
        order.id
    }

    #[tokio::test]
    async fn test_refund_marks_order() {
        let store = MemoryStore::new();
        let order_id = placed_order(&store, 1, "abc123").await;

        let refund = request_refund(&store, 1, "abc123", "Damaged", "me@example.com")
            .await
            .unwrap();

        assert_eq!(refund.order_id, order_id);
        assert!(!refund.accepted);
        let orders = store.orders_of(1).await;
        assert!(orders[0].refund_requested);
    }

    #[tokio::test]
    async fn test_second_refund_request_is_rejected() {
        let store = MemoryStore::new();
        placed_order(&store, 1, "abc123").await;
        request_refund(&store, 1, "abc123", "Damaged", "me@example.com")
            .await
            .unwrap();

        let err = request_refund(&store, 1, "abc123", "Still damaged", "me@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, RefundError::AlreadyRequested));
        assert_eq!(
            AppError::from(err).status(),
            axum::http::StatusCode::BAD_REQUEST
        );
        assert_eq!(store.refunds().await.len(), 1);
    }

    #[tokio::test]
    async fn test_refund_for_unknown_or_foreign_order() {
        let store = MemoryStore::new();
        placed_order(&store, 1, "abc123").await;

        let err = request_refund(&store, 2, "abc123", "Damaged", "me@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, RefundError::OrderNotFound));
        assert_eq!(err.to_string(), "This order does not exist");
        assert!(store.refunds().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_ref_code() {
        let store = MemoryStore::new();

        let err = request_refund(&store, 1, "", "Damaged", "me@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, RefundError::MissingField("ref_code")));
    }
}
