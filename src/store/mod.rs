//! Data access for every persisted entity.
//!
//! Services talk to the database only through [`Store`]. `PgStore` is the
//! production implementation; tests run against the in-memory one.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;

use crate::{
    models::{
        AddressEntity, CommentEntity, CouponEntity, CreateAddressEntity, CreateCommentEntity,
        CreateRatingEntity, CreateRefundEntity, FinalizeOrder, ItemEntity, OrderEntity,
        OrderItemEntity, PaymentEntity, RatingEntity, RefundEntity, SavedItemEntity,
        UpdateAddressEntity, UserProfileEntity,
    },
    reference::{AddressType, Genre},
};

pub use postgres::PgStore;

/// Field filters applied to a catalog query. `None` means "no constraint".
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub genre: Option<Genre>,
    pub author_name: Option<String>,
}

/// Orderings the store can push down to the database. Every ordering breaks
/// ties by ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemOrder {
    #[default]
    Id,
    /// Ascending, items without an author last.
    AuthorName,
    Price,
    ReleaseDate,
}

/// An order line joined with the catalog item it refers to.
pub type OrderLine = (OrderItemEntity, ItemEntity);

#[async_trait]
pub trait Store: Send + Sync {
    // Catalog

    async fn list_items(&self, offset: i64, limit: i64) -> Result<Vec<ItemEntity>>;
    async fn count_items(&self) -> Result<i64>;
    async fn get_item(&self, id: i32) -> Result<Option<ItemEntity>>;
    async fn find_item_by_slug(&self, slug: &str) -> Result<Option<ItemEntity>>;
    async fn filter_items(&self, filter: &ItemFilter, order: ItemOrder) -> Result<Vec<ItemEntity>>;
    /// Raw `(item_id, rating)` pairs for the given items.
    async fn rating_values(&self, item_ids: &[i32]) -> Result<Vec<(i32, i32)>>;

    // Comments & ratings

    async fn list_comments(&self, book_title: Option<&str>) -> Result<Vec<CommentEntity>>;
    async fn create_comment(&self, comment: CreateCommentEntity) -> Result<CommentEntity>;
    async fn delete_comment(&self, user_id: i32, id: i32) -> Result<bool>;
    async fn list_ratings(&self, book_title: Option<&str>) -> Result<Vec<RatingEntity>>;
    async fn create_rating(&self, rating: CreateRatingEntity) -> Result<RatingEntity>;
    async fn delete_rating(&self, user_id: i32, id: i32) -> Result<bool>;

    // Cart & orders

    async fn find_active_order(&self, user_id: i32) -> Result<Option<OrderEntity>>;
    /// Returns the user's active order, creating it if none exists.
    async fn create_active_order(&self, user_id: i32) -> Result<OrderEntity>;
    async fn list_placed_orders(&self, user_id: i32) -> Result<Vec<OrderEntity>>;
    async fn find_placed_order_by_ref_code(
        &self,
        user_id: i32,
        ref_code: &str,
    ) -> Result<Option<OrderEntity>>;
    async fn list_order_lines(&self, order_ids: &[i32]) -> Result<Vec<OrderLine>>;
    async fn find_order_item(&self, order_id: i32, item_id: i32)
    -> Result<Option<OrderItemEntity>>;
    async fn get_order_item(&self, user_id: i32, id: i32) -> Result<Option<OrderItemEntity>>;
    /// Attaches the item with quantity 1, or bumps the quantity of the existing line.
    async fn add_order_item(
        &self,
        user_id: i32,
        order_id: i32,
        item_id: i32,
    ) -> Result<OrderItemEntity>;
    async fn set_order_item_quantity(&self, id: i32, quantity: i32) -> Result<OrderItemEntity>;
    async fn delete_order_item(&self, id: i32) -> Result<()>;
    async fn find_coupon_by_code(&self, code: &str) -> Result<Option<CouponEntity>>;
    async fn get_coupons(&self, ids: &[i32]) -> Result<Vec<CouponEntity>>;
    async fn set_order_coupon(&self, order_id: i32, coupon_id: i32) -> Result<OrderEntity>;
    /// Records the payment and flips the order and its lines to ordered, atomically.
    /// Returns `None` if the order was no longer active.
    async fn finalize_order(
        &self,
        finalize: FinalizeOrder,
    ) -> Result<Option<(OrderEntity, PaymentEntity)>>;
    /// Flags the order and records the refund, atomically. Returns `None` if a
    /// refund was already requested for the order.
    async fn create_refund(&self, refund: CreateRefundEntity) -> Result<Option<RefundEntity>>;

    // Address book

    async fn list_addresses(
        &self,
        user_id: i32,
        address_type: Option<AddressType>,
    ) -> Result<Vec<AddressEntity>>;
    async fn get_address(&self, user_id: i32, id: i32) -> Result<Option<AddressEntity>>;
    async fn create_address(&self, address: CreateAddressEntity) -> Result<AddressEntity>;
    async fn update_address(
        &self,
        user_id: i32,
        id: i32,
        changes: UpdateAddressEntity,
    ) -> Result<Option<AddressEntity>>;
    async fn delete_address(&self, user_id: i32, id: i32) -> Result<bool>;
    async fn clear_default_addresses(&self, user_id: i32, address_type: AddressType)
    -> Result<()>;

    // Profiles & payments

    async fn get_or_create_profile(&self, user_id: i32) -> Result<UserProfileEntity>;
    async fn set_stripe_customer_id(
        &self,
        user_id: i32,
        customer_id: &str,
    ) -> Result<UserProfileEntity>;
    async fn list_payments(&self, user_id: i32) -> Result<Vec<PaymentEntity>>;

    // Saved for later

    async fn list_saved_items(&self, user_id: i32) -> Result<Vec<(SavedItemEntity, ItemEntity)>>;
    /// Saving an already saved item returns the existing entry.
    async fn save_item(&self, user_id: i32, item_id: i32) -> Result<SavedItemEntity>;
    async fn delete_saved_item(&self, user_id: i32, id: i32) -> Result<bool>;
}
