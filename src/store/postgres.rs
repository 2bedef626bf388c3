use anyhow::{Context, Result};
use async_trait::async_trait;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{
    AsyncConnection, AsyncPgConnection, RunQueryDsl, pooled_connection::bb8::Pool,
};

use crate::{
    models::{
        AddressEntity, CommentEntity, CouponEntity, CreateAddressEntity, CreateCommentEntity,
        CreateOrderEntity, CreateOrderItemEntity, CreateRatingEntity, CreateRefundEntity,
        CreateSavedItemEntity, CreateUserProfileEntity, FinalizeOrder, ItemEntity, OrderEntity,
        OrderItemEntity, PaymentEntity, RatingEntity, RefundEntity, SavedItemEntity,
        UpdateAddressEntity, UserProfileEntity,
    },
    reference::AddressType,
    schema::{
        addresses, comments, coupons, items, order_items, orders, payments, ratings, refunds,
        saved_items, user_profiles,
    },
    store::{ItemFilter, ItemOrder, OrderLine, Store},
};

pub type DbPool = Pool<AsyncPgConnection>;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_items(&self, offset: i64, limit: i64) -> Result<Vec<ItemEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        items::table
            .order_by(items::id.asc())
            .offset(offset)
            .limit(limit)
            .select(ItemEntity::as_select())
            .get_results(conn)
            .await
            .context("Failed to get items")
    }

    async fn count_items(&self) -> Result<i64> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        items::table
            .count()
            .get_result(conn)
            .await
            .context("Failed to count items")
    }

    async fn get_item(&self, id: i32) -> Result<Option<ItemEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        items::table
            .find(id)
            .select(ItemEntity::as_select())
            .first(conn)
            .await
            .optional()
            .context("Failed to get item")
    }

    async fn find_item_by_slug(&self, slug: &str) -> Result<Option<ItemEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        items::table
            .filter(items::slug.eq(slug))
            .select(ItemEntity::as_select())
            .first(conn)
            .await
            .optional()
            .context("Failed to get item by slug")
    }

    async fn filter_items(&self, filter: &ItemFilter, order: ItemOrder) -> Result<Vec<ItemEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let mut query = items::table.select(ItemEntity::as_select()).into_boxed();

        if let Some(genre) = filter.genre {
            query = query.filter(items::genre.eq(genre.code));
        }
        if let Some(author_name) = &filter.author_name {
            query = query.filter(items::author_name.eq(author_name.as_str()));
        }

        // Postgres sorts NULLs last in ascending order.
        query = match order {
            ItemOrder::Id => query.order_by(items::id.asc()),
            ItemOrder::AuthorName => query
                .order_by(items::author_name.asc())
                .then_order_by(items::id.asc()),
            ItemOrder::Price => query
                .order_by(items::price.asc())
                .then_order_by(items::id.asc()),
            ItemOrder::ReleaseDate => query
                .order_by(items::release_date.asc())
                .then_order_by(items::id.asc()),
        };

        query
            .get_results(conn)
            .await
            .context("Failed to filter items")
    }

    async fn rating_values(&self, item_ids: &[i32]) -> Result<Vec<(i32, i32)>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        ratings::table
            .filter(ratings::item_id.eq_any(item_ids.to_vec()))
            .select((ratings::item_id, ratings::rating))
            .get_results(conn)
            .await
            .context("Failed to get ratings")
    }

    async fn list_comments(&self, book_title: Option<&str>) -> Result<Vec<CommentEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let mut query = comments::table
            .select(CommentEntity::as_select())
            .order_by(comments::created_at.desc())
            .into_boxed();
        if let Some(book_title) = book_title {
            query = query.filter(comments::book_title.eq(book_title));
        }

        query
            .get_results(conn)
            .await
            .context("Failed to get comments")
    }

    async fn create_comment(&self, comment: CreateCommentEntity) -> Result<CommentEntity> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::insert_into(comments::table)
            .values(comment)
            .returning(CommentEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to create comment")
    }

    async fn delete_comment(&self, user_id: i32, id: i32) -> Result<bool> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let deleted = diesel::delete(
            comments::table
                .filter(comments::id.eq(id))
                .filter(comments::user_id.eq(user_id)),
        )
        .execute(conn)
        .await
        .context("Failed to delete comment")?;

        Ok(deleted > 0)
    }

    async fn list_ratings(&self, book_title: Option<&str>) -> Result<Vec<RatingEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let mut query = ratings::table
            .select(RatingEntity::as_select())
            .order_by(ratings::created_at.desc())
            .into_boxed();
        if let Some(book_title) = book_title {
            query = query.filter(ratings::book_title.eq(book_title));
        }

        query
            .get_results(conn)
            .await
            .context("Failed to get ratings")
    }

    async fn create_rating(&self, rating: CreateRatingEntity) -> Result<RatingEntity> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::insert_into(ratings::table)
            .values(rating)
            .returning(RatingEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to create rating")
    }

    async fn delete_rating(&self, user_id: i32, id: i32) -> Result<bool> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let deleted = diesel::delete(
            ratings::table
                .filter(ratings::id.eq(id))
                .filter(ratings::user_id.eq(user_id)),
        )
        .execute(conn)
        .await
        .context("Failed to delete rating")?;

        Ok(deleted > 0)
    }

    async fn find_active_order(&self, user_id: i32) -> Result<Option<OrderEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        orders::table
            .filter(orders::user_id.eq(user_id))
            .filter(orders::ordered.eq(false))
            .select(OrderEntity::as_select())
            .first(conn)
            .await
            .optional()
            .context("Failed to get active order")
    }

    async fn create_active_order(&self, user_id: i32) -> Result<OrderEntity> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        // A concurrent request may have created the cart first; the partial
        // unique index turns our insert into a no-op and we read theirs.
        let created: Option<OrderEntity> = diesel::insert_into(orders::table)
            .values(CreateOrderEntity { user_id })
            .on_conflict_do_nothing()
            .returning(OrderEntity::as_returning())
            .get_result(conn)
            .await
            .optional()
            .context("Failed to create order")?;

        match created {
            Some(order) => Ok(order),
            None => orders::table
                .filter(orders::user_id.eq(user_id))
                .filter(orders::ordered.eq(false))
                .select(OrderEntity::as_select())
                .first(conn)
                .await
                .context("Failed to get active order"),
        }
    }

    async fn list_placed_orders(&self, user_id: i32) -> Result<Vec<OrderEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        orders::table
            .filter(orders::user_id.eq(user_id))
            .filter(orders::ordered.eq(true))
            .order_by(orders::ordered_date.desc())
            .then_order_by(orders::id.desc())
            .select(OrderEntity::as_select())
            .get_results(conn)
            .await
            .context("Failed to get placed orders")
    }

    async fn find_placed_order_by_ref_code(
        &self,
        user_id: i32,
        ref_code: &str,
    ) -> Result<Option<OrderEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        orders::table
            .filter(orders::user_id.eq(user_id))
            .filter(orders::ordered.eq(true))
            .filter(orders::ref_code.eq(ref_code))
            .select(OrderEntity::as_select())
            .first(conn)
            .await
            .optional()
            .context("Failed to get order by reference code")
    }

    async fn list_order_lines(&self, order_ids: &[i32]) -> Result<Vec<OrderLine>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        order_items::table
            .inner_join(items::table)
            .filter(order_items::order_id.eq_any(order_ids.to_vec()))
            .order_by(order_items::id.asc())
            .select((OrderItemEntity::as_select(), ItemEntity::as_select()))
            .get_results(conn)
            .await
            .context("Failed to get order lines")
    }

    async fn find_order_item(
        &self,
        order_id: i32,
        item_id: i32,
    ) -> Result<Option<OrderItemEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        order_items::table
            .filter(order_items::order_id.eq(order_id))
            .filter(order_items::item_id.eq(item_id))
            .select(OrderItemEntity::as_select())
            .first(conn)
            .await
            .optional()
            .context("Failed to get order item")
    }

    async fn get_order_item(&self, user_id: i32, id: i32) -> Result<Option<OrderItemEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        order_items::table
            .find(id)
            .filter(order_items::user_id.eq(user_id))
            .select(OrderItemEntity::as_select())
            .first(conn)
            .await
            .optional()
            .context("Failed to get order item")
    }

    async fn add_order_item(
        &self,
        user_id: i32,
        order_id: i32,
        item_id: i32,
    ) -> Result<OrderItemEntity> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::insert_into(order_items::table)
            .values(CreateOrderItemEntity {
                user_id,
                order_id,
                item_id,
                quantity: 1,
            })
            .on_conflict((order_items::order_id, order_items::item_id))
            .do_update()
            .set(order_items::quantity.eq(order_items::quantity + 1))
            .returning(OrderItemEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to upsert order item")
    }

    async fn set_order_item_quantity(&self, id: i32, quantity: i32) -> Result<OrderItemEntity> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::update(order_items::table.find(id))
            .set(order_items::quantity.eq(quantity))
            .returning(OrderItemEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to update order item quantity")
    }

    async fn delete_order_item(&self, id: i32) -> Result<()> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::delete(order_items::table.find(id))
            .execute(conn)
            .await
            .context("Failed to delete order item")?;

        Ok(())
    }

    async fn find_coupon_by_code(&self, code: &str) -> Result<Option<CouponEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        coupons::table
            .filter(coupons::code.eq(code))
            .select(CouponEntity::as_select())
            .first(conn)
            .await
            .optional()
            .context("Failed to get coupon")
    }

    async fn get_coupons(&self, ids: &[i32]) -> Result<Vec<CouponEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        coupons::table
            .filter(coupons::id.eq_any(ids.to_vec()))
            .select(CouponEntity::as_select())
            .get_results(conn)
            .await
            .context("Failed to get coupons")
    }

    async fn set_order_coupon(&self, order_id: i32, coupon_id: i32) -> Result<OrderEntity> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::update(orders::table.find(order_id))
            .set(orders::coupon_id.eq(Some(coupon_id)))
            .returning(OrderEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to attach coupon")
    }

    async fn finalize_order(
        &self,
        finalize: FinalizeOrder,
    ) -> Result<Option<(OrderEntity, PaymentEntity)>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        conn.transaction(move |conn| {
            Box::pin(async move {
                let order: Option<OrderEntity> = orders::table
                    .find(finalize.order_id)
                    .filter(orders::ordered.eq(false))
                    .select(OrderEntity::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()
                    .context("Failed to lock order")?;

                if order.is_none() {
                    return Ok(None);
                }

                let payment: PaymentEntity = diesel::insert_into(payments::table)
                    .values(finalize.payment)
                    .returning(PaymentEntity::as_returning())
                    .get_result(conn)
                    .await
                    .context("Failed to create payment")?;

                diesel::update(order_items::table)
                    .filter(order_items::order_id.eq(finalize.order_id))
                    .set(order_items::ordered.eq(true))
                    .execute(conn)
                    .await
                    .context("Failed to mark order items as ordered")?;

                let order = diesel::update(orders::table.find(finalize.order_id))
                    .set((
                        orders::ordered.eq(true),
                        orders::ordered_date.eq(Some(finalize.ordered_date)),
                        orders::payment_id.eq(Some(payment.id)),
                        orders::billing_address_id.eq(Some(finalize.billing_address_id)),
                        orders::shipping_address_id.eq(Some(finalize.shipping_address_id)),
                        orders::ref_code.eq(Some(finalize.ref_code)),
                    ))
                    .returning(OrderEntity::as_returning())
                    .get_result(conn)
                    .await
                    .context("Failed to mark order as ordered")?;

                Ok::<Option<(OrderEntity, PaymentEntity)>, anyhow::Error>(Some((order, payment)))
            })
        })
        .await
        .context("Transaction failed")
    }

    async fn create_refund(&self, refund: CreateRefundEntity) -> Result<Option<RefundEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        conn.transaction(move |conn| {
            Box::pin(async move {
                let flagged = diesel::update(
                    orders::table
                        .find(refund.order_id)
                        .filter(orders::refund_requested.eq(false)),
                )
                .set(orders::refund_requested.eq(true))
                .execute(conn)
                .await
                .context("Failed to flag refund on order")?;
                if flagged == 0 {
                    return Ok(None);
                }

                let refund = diesel::insert_into(refunds::table)
                    .values(refund)
                    .returning(RefundEntity::as_returning())
                    .get_result(conn)
                    .await
                    .context("Failed to create refund")?;

                Ok::<Option<RefundEntity>, anyhow::Error>(Some(refund))
            })
        })
        .await
        .context("Transaction failed")
    }

    async fn list_addresses(
        &self,
        user_id: i32,
        address_type: Option<AddressType>,
    ) -> Result<Vec<AddressEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let mut query = addresses::table
            .filter(addresses::user_id.eq(user_id))
            .order_by(addresses::id.asc())
            .select(AddressEntity::as_select())
            .into_boxed();
        if let Some(address_type) = address_type {
            query = query.filter(addresses::address_type.eq(address_type.code()));
        }

        query
            .get_results(conn)
            .await
            .context("Failed to get addresses")
    }

    async fn get_address(&self, user_id: i32, id: i32) -> Result<Option<AddressEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        addresses::table
            .find(id)
            .filter(addresses::user_id.eq(user_id))
            .select(AddressEntity::as_select())
            .first(conn)
            .await
            .optional()
            .context("Failed to get address")
    }

    async fn create_address(&self, address: CreateAddressEntity) -> Result<AddressEntity> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::insert_into(addresses::table)
            .values(address)
            .returning(AddressEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to create address")
    }

    async fn update_address(
        &self,
        user_id: i32,
        id: i32,
        changes: UpdateAddressEntity,
    ) -> Result<Option<AddressEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::update(
            addresses::table
                .filter(addresses::id.eq(id))
                .filter(addresses::user_id.eq(user_id)),
        )
        .set(changes)
        .returning(AddressEntity::as_returning())
        .get_result(conn)
        .await
        .optional()
        .context("Failed to update address")
    }

    async fn delete_address(&self, user_id: i32, id: i32) -> Result<bool> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let deleted = diesel::delete(
            addresses::table
                .filter(addresses::id.eq(id))
                .filter(addresses::user_id.eq(user_id)),
        )
        .execute(conn)
        .await
        .context("Failed to delete address")?;

        Ok(deleted > 0)
    }

    async fn clear_default_addresses(
        &self,
        user_id: i32,
        address_type: AddressType,
    ) -> Result<()> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::update(
            addresses::table
                .filter(addresses::user_id.eq(user_id))
                .filter(addresses::address_type.eq(address_type.code()))
                .filter(addresses::is_default.eq(true)),
        )
        .set(addresses::is_default.eq(false))
        .execute(conn)
        .await
        .context("Failed to clear default addresses")?;

        Ok(())
    }

    async fn get_or_create_profile(&self, user_id: i32) -> Result<UserProfileEntity> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::insert_into(user_profiles::table)
            .values(CreateUserProfileEntity { user_id })
            .on_conflict_do_nothing()
            .execute(conn)
            .await
            .context("Failed to create user profile")?;

        user_profiles::table
            .find(user_id)
            .select(UserProfileEntity::as_select())
            .first(conn)
            .await
            .context("Failed to get user profile")
    }

    async fn set_stripe_customer_id(
        &self,
        user_id: i32,
        customer_id: &str,
    ) -> Result<UserProfileEntity> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::update(user_profiles::table.find(user_id))
            .set((
                user_profiles::stripe_customer_id.eq(Some(customer_id)),
                user_profiles::one_click_purchasing.eq(true),
            ))
            .returning(UserProfileEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to store Stripe customer id")
    }

    async fn list_payments(&self, user_id: i32) -> Result<Vec<PaymentEntity>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        payments::table
            .filter(payments::user_id.eq(user_id))
            .order_by(payments::created_at.desc())
            .select(PaymentEntity::as_select())
            .get_results(conn)
            .await
            .context("Failed to get payments")
    }

    async fn list_saved_items(&self, user_id: i32) -> Result<Vec<(SavedItemEntity, ItemEntity)>> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        saved_items::table
            .inner_join(items::table)
            .filter(saved_items::user_id.eq(user_id))
            .order_by(saved_items::created_at.desc())
            .select((SavedItemEntity::as_select(), ItemEntity::as_select()))
            .get_results(conn)
            .await
            .context("Failed to get saved items")
    }

    async fn save_item(&self, user_id: i32, item_id: i32) -> Result<SavedItemEntity> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::insert_into(saved_items::table)
            .values(CreateSavedItemEntity { user_id, item_id })
            .on_conflict((saved_items::user_id, saved_items::item_id))
            .do_nothing()
            .execute(conn)
            .await
            .context("Failed to save item")?;

        saved_items::table
            .filter(saved_items::user_id.eq(user_id))
            .filter(saved_items::item_id.eq(item_id))
            .select(SavedItemEntity::as_select())
            .first(conn)
            .await
            .context("Failed to get saved item")
    }

    async fn delete_saved_item(&self, user_id: i32, id: i32) -> Result<bool> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let deleted = diesel::delete(
            saved_items::table
                .filter(saved_items::id.eq(id))
                .filter(saved_items::user_id.eq(user_id)),
        )
        .execute(conn)
        .await
        .context("Failed to delete saved item")?;

        Ok(deleted > 0)
    }
}
