//! The active cart: an unordered order per user and its lines.

use std::collections::HashMap;

use thiserror::Error;

use crate::{
    app::error::AppError,
    models::{CouponEntity, ItemEntity, OrderEntity, OrderItemEntity},
    store::{OrderLine, Store},
};

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Invalid request")]
    MissingSlug,

    #[error("Invalid data received")]
    MissingCouponCode,

    #[error("This item does not exist")]
    ItemNotFound,

    #[error("You do not have an active order")]
    NoActiveOrder,

    #[error("This item was not in your cart")]
    ItemNotInCart,

    #[error("This order item does not exist")]
    OrderItemNotFound,

    #[error("This coupon does not exist")]
    CouponNotFound,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::OrderItemNotFound => AppError::NotFound(err.to_string()),
            CartError::Store(err) => AppError::Other(err),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

/// An order together with everything needed to price it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub order: OrderEntity,
    pub lines: Vec<OrderLine>,
    pub coupon: Option<CouponEntity>,
    pub total: f64,
}

/// Quantity times the discounted unit price when there is one.
pub fn line_final_price(line: &OrderItemEntity, item: &ItemEntity) -> f64 {
    f64::from(line.quantity) * item.unit_price()
}

pub fn line_amount_saved(line: &OrderItemEntity, item: &ItemEntity) -> f64 {
    match item.discount_price {
        Some(discount_price) => f64::from(line.quantity) * (item.price - discount_price),
        None => 0.0,
    }
}

/// Sum of line prices minus the coupon, never below zero.
pub fn order_total(lines: &[OrderLine], coupon: Option<&CouponEntity>) -> f64 {
    let subtotal: f64 = lines
        .iter()
        .map(|(line, item)| line_final_price(line, item))
        .sum();
    let discount = coupon.map(|coupon| coupon.amount).unwrap_or(0.0);
    (subtotal - discount).max(0.0)
}

fn require_slug(slug: &str) -> Result<&str, CartError> {
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(CartError::MissingSlug);
    }
    Ok(slug)
}

pub async fn add_to_cart(
    store: &dyn Store,
    user_id: i32,
    slug: &str,
) -> Result<OrderItemEntity, CartError> {
    let slug = require_slug(slug)?;
    let item = store
        .find_item_by_slug(slug)
        .await?
        .ok_or(CartError::ItemNotFound)?;

    let order = store.create_active_order(user_id).await?;
    let line = store.add_order_item(user_id, order.id, item.id).await?;

    tracing::debug!(
        "User {} now has {} x {} in order {}",
        user_id,
        line.quantity,
        item.slug,
        order.id
    );
    Ok(line)
}

/// Lowers the quantity of a cart line by one, removing the line when it
/// reaches zero. Returns the remaining line, if any.
pub async fn decrement_or_remove(
    store: &dyn Store,
    user_id: i32,
    slug: &str,
) -> Result<Option<OrderItemEntity>, CartError> {
    let slug = require_slug(slug)?;
    let item = store
        .find_item_by_slug(slug)
        .await?
        .ok_or(CartError::ItemNotFound)?;
    let order = store
        .find_active_order(user_id)
        .await?
        .ok_or(CartError::NoActiveOrder)?;
    let line = store
        .find_order_item(order.id, item.id)
        .await?
        .ok_or(CartError::ItemNotInCart)?;

    if line.quantity > 1 {
        let line = store
            .set_order_item_quantity(line.id, line.quantity - 1)
            .await?;
        return Ok(Some(line));
    }

    store.delete_order_item(line.id).await?;
    Ok(None)
}

/// Deletes a line of the user's active order whatever its quantity.
pub async fn remove_order_item(
    store: &dyn Store,
    user_id: i32,
    order_item_id: i32,
) -> Result<(), CartError> {
    let line = store
        .get_order_item(user_id, order_item_id)
        .await?
        .filter(|line| !line.ordered)
        .ok_or(CartError::OrderItemNotFound)?;

    store.delete_order_item(line.id).await?;
    Ok(())
}

pub async fn apply_coupon(
    store: &dyn Store,
    user_id: i32,
    code: &str,
) -> Result<OrderEntity, CartError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(CartError::MissingCouponCode);
    }

    let order = store
        .find_active_order(user_id)
        .await?
        .ok_or(CartError::NoActiveOrder)?;
    let coupon = store
        .find_coupon_by_code(code)
        .await?
        .ok_or(CartError::CouponNotFound)?;

    let order = store.set_order_coupon(order.id, coupon.id).await?;
    tracing::info!("Applied coupon {} to order {}", coupon.code, order.id);
    Ok(order)
}

/// Loads lines and coupons for a batch of orders, preserving their order.
pub async fn summarize(
    store: &dyn Store,
    orders: Vec<OrderEntity>,
) -> anyhow::Result<Vec<OrderSummary>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i32> = orders.iter().map(|order| order.id).collect();
    let coupon_ids: Vec<i32> = orders.iter().filter_map(|order| order.coupon_id).collect();

    let mut lines_by_order: HashMap<i32, Vec<OrderLine>> = HashMap::new();
    for (line, item) in store.list_order_lines(&order_ids).await? {
        lines_by_order
            .entry(line.order_id)
            .or_default()
            .push((line, item));
    }

    let coupons: HashMap<i32, CouponEntity> = store
        .get_coupons(&coupon_ids)
        .await?
        .into_iter()
        .map(|coupon| (coupon.id, coupon))
        .collect();

    Ok(orders
        .into_iter()
        .map(|order| {
            let mut lines = lines_by_order.remove(&order.id).unwrap_or_default();
            lines.sort_by_key(|(line, _)| line.id);
            let coupon = order.coupon_id.and_then(|id| coupons.get(&id).cloned());
            let total = order_total(&lines, coupon.as_ref());
            OrderSummary {
                order,
                lines,
                coupon,
                total,
            }
        })
        .collect())
}

/// The user's active order, if they have one.
pub async fn order_summary(
    store: &dyn Store,
    user_id: i32,
) -> Result<Option<OrderSummary>, CartError> {
    let Some(order) = store.find_active_order(user_id).await? else {
        return Ok(None);
    };

    Ok(summarize(store, vec![order]).await?.pop())
}

/// Placed orders, newest first.
pub async fn order_history(
    store: &dyn Store,
    user_id: i32,
) -> Result<Vec<OrderSummary>, CartError> {
    let orders = store.list_placed_orders(user_id).await?;
    Ok(summarize(store, orders).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::memory::MemoryStore, test_support::seed_item};

    const USER: i32 = 1;

    #[tokio::test]
    async fn test_adding_same_slug_twice_bumps_quantity() {
        let store = MemoryStore::new();
        seed_item(&store, "dune", 10.0, None, "SF").await;

        add_to_cart(&store, USER, "dune").await.unwrap();
        let line = add_to_cart(&store, USER, "dune").await.unwrap();

        assert_eq!(line.quantity, 2);
        assert_eq!(store.order_items_of(USER).await.len(), 1);
        assert_eq!(store.orders_of(USER).await.len(), 1);
    }

    #[tokio::test]
    async fn test_add_unknown_slug() {
        let store = MemoryStore::new();

        let err = add_to_cart(&store, USER, "missing").await.unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound));
        assert!(store.orders_of(USER).await.is_empty());

        let err = add_to_cart(&store, USER, "  ").await.unwrap_err();
        assert!(matches!(err, CartError::MissingSlug));
    }

    #[tokio::test]
    async fn test_total_with_coupon() {
        let store = MemoryStore::new();
        seed_item(&store, "a", 10.0, None, "FA").await;
        seed_item(&store, "b", 15.0, None, "FA").await;
        store.insert_coupon("SAVE5", 5.0).await;

        add_to_cart(&store, USER, "a").await.unwrap();
        add_to_cart(&store, USER, "b").await.unwrap();
        apply_coupon(&store, USER, "SAVE5").await.unwrap();

        let summary = order_summary(&store, USER).await.unwrap().unwrap();
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.coupon.map(|c| c.code), Some("SAVE5".to_string()));
        assert!((summary.total - 20.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_discount_price_and_amount_saved() {
        let store = MemoryStore::new();
        seed_item(&store, "sale", 12.0, Some(9.0), "HO").await;

        add_to_cart(&store, USER, "sale").await.unwrap();
        add_to_cart(&store, USER, "sale").await.unwrap();

        let summary = order_summary(&store, USER).await.unwrap().unwrap();
        let (line, item) = &summary.lines[0];
        assert!((line_final_price(line, item) - 18.0).abs() < f64::EPSILON);
        assert!((line_amount_saved(line, item) - 6.0).abs() < f64::EPSILON);
        assert!((summary.total - 18.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_total_is_floored_at_zero() {
        let store = MemoryStore::new();
        seed_item(&store, "cheap", 3.0, None, "PO").await;
        store.insert_coupon("BIG", 50.0).await;

        add_to_cart(&store, USER, "cheap").await.unwrap();
        apply_coupon(&store, USER, "BIG").await.unwrap();

        let summary = order_summary(&store, USER).await.unwrap().unwrap();
        assert_eq!(summary.total, 0.0);
    }

    #[tokio::test]
    async fn test_decrement_then_remove() {
        let store = MemoryStore::new();
        seed_item(&store, "dune", 10.0, None, "SF").await;
        for _ in 0..3 {
            add_to_cart(&store, USER, "dune").await.unwrap();
        }

        let line = decrement_or_remove(&store, USER, "dune").await.unwrap();
        assert_eq!(line.map(|l| l.quantity), Some(2));

        decrement_or_remove(&store, USER, "dune").await.unwrap();
        let line = decrement_or_remove(&store, USER, "dune").await.unwrap();
        assert!(line.is_none());
        assert!(store.order_items_of(USER).await.is_empty());

        let err = decrement_or_remove(&store, USER, "dune").await.unwrap_err();
        assert!(matches!(err, CartError::ItemNotInCart));
    }

    #[tokio::test]
    async fn test_decrement_without_active_order() {
        let store = MemoryStore::new();
        seed_item(&store, "dune", 10.0, None, "SF").await;

        let err = decrement_or_remove(&store, USER, "dune").await.unwrap_err();
        assert!(matches!(err, CartError::NoActiveOrder));
        assert_eq!(err.to_string(), "You do not have an active order");
    }

    #[tokio::test]
    async fn test_remove_order_item_is_scoped_to_owner() {
        let store = MemoryStore::new();
        seed_item(&store, "dune", 10.0, None, "SF").await;
        let line = add_to_cart(&store, USER, "dune").await.unwrap();

        let err = remove_order_item(&store, USER + 1, line.id).await.unwrap_err();
        assert!(matches!(err, CartError::OrderItemNotFound));

        remove_order_item(&store, USER, line.id).await.unwrap();
        assert!(store.order_items_of(USER).await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_coupon() {
        let store = MemoryStore::new();
        seed_item(&store, "dune", 10.0, None, "SF").await;

        let err = apply_coupon(&store, USER, "NOPE").await.unwrap_err();
        assert!(matches!(err, CartError::NoActiveOrder));

        add_to_cart(&store, USER, "dune").await.unwrap();
        let err = apply_coupon(&store, USER, "NOPE").await.unwrap_err();
        assert!(matches!(err, CartError::CouponNotFound));
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            AppError::from(CartError::ItemNotInCart).status(),
            axum::http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(CartError::OrderItemNotFound).status(),
            axum::http::StatusCode::NOT_FOUND
        );
    }
}
