//! In-memory [`Store`] used by the test suite.

use std::cmp::Ordering;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    models::{
        AddressEntity, CommentEntity, CouponEntity, CreateAddressEntity, CreateCommentEntity,
        CreateItemEntity, CreateRatingEntity, CreateRefundEntity, FinalizeOrder, ItemEntity,
        OrderEntity, OrderItemEntity, PaymentEntity, RatingEntity, RefundEntity,
        SavedItemEntity, UpdateAddressEntity, UserProfileEntity,
    },
    reference::AddressType,
    store::{ItemFilter, ItemOrder, OrderLine, Store},
};

#[derive(Default)]
struct Tables {
    next_id: i32,
    items: Vec<ItemEntity>,
    comments: Vec<CommentEntity>,
    ratings: Vec<RatingEntity>,
    orders: Vec<OrderEntity>,
    order_items: Vec<OrderItemEntity>,
    coupons: Vec<CouponEntity>,
    payments: Vec<PaymentEntity>,
    refunds: Vec<RefundEntity>,
    addresses: Vec<AddressEntity>,
    profiles: Vec<UserProfileEntity>,
    saved_items: Vec<SavedItemEntity>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn item(&self, id: i32) -> Result<ItemEntity> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("item {id} does not exist"))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_item(&self, item: CreateItemEntity) -> ItemEntity {
        let mut tables = self.tables.lock().await;
        let item = ItemEntity {
            id: tables.next_id(),
            title: item.title,
            price: item.price,
            discount_price: item.discount_price,
            genre: item.genre,
            label: item.label,
            slug: item.slug,
            description: item.description,
            image: item.image,
            publisher_info: item.publisher_info,
            author_name: item.author_name,
            author_bio: item.author_bio,
            release_date: item.release_date,
        };
        tables.items.push(item.clone());
        item
    }

    pub async fn insert_coupon(&self, code: &str, amount: f64) -> CouponEntity {
        let mut tables = self.tables.lock().await;
        let coupon = CouponEntity {
            id: tables.next_id(),
            code: code.to_string(),
            amount,
        };
        tables.coupons.push(coupon.clone());
        coupon
    }

    pub async fn orders_of(&self, user_id: i32) -> Vec<OrderEntity> {
        let tables = self.tables.lock().await;
        tables
            .orders
            .iter()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn order_items_of(&self, user_id: i32) -> Vec<OrderItemEntity> {
        let tables = self.tables.lock().await;
        tables
            .order_items
            .iter()
            .filter(|line| line.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn refunds(&self) -> Vec<RefundEntity> {
        self.tables.lock().await.refunds.clone()
    }
}

fn cmp_id(a: &ItemEntity, b: &ItemEntity) -> Ordering {
    a.id.cmp(&b.id)
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_items(&self, offset: i64, limit: i64) -> Result<Vec<ItemEntity>> {
        let tables = self.tables.lock().await;
        let mut items = tables.items.clone();
        items.sort_by(cmp_id);
        Ok(items
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_items(&self) -> Result<i64> {
        Ok(self.tables.lock().await.items.len() as i64)
    }

    async fn get_item(&self, id: i32) -> Result<Option<ItemEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables.items.iter().find(|item| item.id == id).cloned())
    }

    async fn find_item_by_slug(&self, slug: &str) -> Result<Option<ItemEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables.items.iter().find(|item| item.slug == slug).cloned())
    }

    async fn filter_items(&self, filter: &ItemFilter, order: ItemOrder) -> Result<Vec<ItemEntity>> {
        let tables = self.tables.lock().await;
        let mut items: Vec<ItemEntity> = tables
            .items
            .iter()
            .filter(|item| filter.genre.is_none_or(|genre| item.genre == genre.code))
            .filter(|item| {
                filter
                    .author_name
                    .as_ref()
                    .is_none_or(|author| item.author_name.as_ref() == Some(author))
            })
            .cloned()
            .collect();

        items.sort_by(|a, b| {
            let primary = match order {
                ItemOrder::Id => Ordering::Equal,
                ItemOrder::AuthorName => match (&a.author_name, &b.author_name) {
                    (Some(x), Some(y)) => x.cmp(y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                },
                ItemOrder::Price => a.price.total_cmp(&b.price),
                ItemOrder::ReleaseDate => a.release_date.cmp(&b.release_date),
            };
            primary.then_with(|| cmp_id(a, b))
        });

        Ok(items)
    }

    async fn rating_values(&self, item_ids: &[i32]) -> Result<Vec<(i32, i32)>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .ratings
            .iter()
            .filter(|rating| item_ids.contains(&rating.item_id))
            .map(|rating| (rating.item_id, rating.rating))
            .collect())
    }

    async fn list_comments(&self, book_title: Option<&str>) -> Result<Vec<CommentEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .comments
            .iter()
            .rev()
            .filter(|comment| book_title.is_none_or(|title| comment.book_title == title))
            .cloned()
            .collect())
    }

    async fn create_comment(&self, comment: CreateCommentEntity) -> Result<CommentEntity> {
        let mut tables = self.tables.lock().await;
        let comment = CommentEntity {
            id: tables.next_id(),
            user_id: comment.user_id,
            username: comment.username,
            item_id: comment.item_id,
            book_title: comment.book_title,
            content: comment.content,
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, user_id: i32, id: i32) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.comments.len();
        tables
            .comments
            .retain(|comment| !(comment.id == id && comment.user_id == user_id));
        Ok(tables.comments.len() < before)
    }

    async fn list_ratings(&self, book_title: Option<&str>) -> Result<Vec<RatingEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .ratings
            .iter()
            .rev()
            .filter(|rating| book_title.is_none_or(|title| rating.book_title == title))
            .cloned()
            .collect())
    }

    async fn create_rating(&self, rating: CreateRatingEntity) -> Result<RatingEntity> {
        let mut tables = self.tables.lock().await;
        let rating = RatingEntity {
            id: tables.next_id(),
            user_id: rating.user_id,
            username: rating.username,
            item_id: rating.item_id,
            book_title: rating.book_title,
            rating: rating.rating,
            created_at: Utc::now(),
        };
        tables.ratings.push(rating.clone());
        Ok(rating)
    }

    async fn delete_rating(&self, user_id: i32, id: i32) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.ratings.len();
        tables
            .ratings
            .retain(|rating| !(rating.id == id && rating.user_id == user_id));
        Ok(tables.ratings.len() < before)
    }

    async fn find_active_order(&self, user_id: i32) -> Result<Option<OrderEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .orders
            .iter()
            .find(|order| order.user_id == user_id && !order.ordered)
            .cloned())
    }

    async fn create_active_order(&self, user_id: i32) -> Result<OrderEntity> {
        let mut tables = self.tables.lock().await;
        if let Some(order) = tables
            .orders
            .iter()
            .find(|order| order.user_id == user_id && !order.ordered)
        {
            return Ok(order.clone());
        }

        let order = OrderEntity {
            id: tables.next_id(),
            user_id,
            ref_code: None,
            start_date: Utc::now(),
            ordered_date: None,
            ordered: false,
            billing_address_id: None,
            shipping_address_id: None,
            payment_id: None,
            coupon_id: None,
            being_delivered: false,
            received: false,
            refund_requested: false,
            refund_granted: false,
        };
        tables.orders.push(order.clone());
        Ok(order)
    }

    async fn list_placed_orders(&self, user_id: i32) -> Result<Vec<OrderEntity>> {
        let tables = self.tables.lock().await;
        let mut orders: Vec<OrderEntity> = tables
            .orders
            .iter()
            .filter(|order| order.user_id == user_id && order.ordered)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.ordered_date.cmp(&a.ordered_date).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn find_placed_order_by_ref_code(
        &self,
        user_id: i32,
        ref_code: &str,
    ) -> Result<Option<OrderEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .orders
            .iter()
            .find(|order| {
                order.user_id == user_id
                    && order.ordered
                    && order.ref_code.as_deref() == Some(ref_code)
            })
            .cloned())
    }

    async fn list_order_lines(&self, order_ids: &[i32]) -> Result<Vec<OrderLine>> {
        let tables = self.tables.lock().await;
        tables
            .order_items
            .iter()
            .filter(|line| order_ids.contains(&line.order_id))
            .map(|line| Ok((line.clone(), tables.item(line.item_id)?)))
            .collect()
    }

    async fn find_order_item(
        &self,
        order_id: i32,
        item_id: i32,
    ) -> Result<Option<OrderItemEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .order_items
            .iter()
            .find(|line| line.order_id == order_id && line.item_id == item_id)
            .cloned())
    }

    async fn get_order_item(&self, user_id: i32, id: i32) -> Result<Option<OrderItemEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .order_items
            .iter()
            .find(|line| line.id == id && line.user_id == user_id)
            .cloned())
    }

    async fn add_order_item(
        &self,
        user_id: i32,
        order_id: i32,
        item_id: i32,
    ) -> Result<OrderItemEntity> {
        let mut tables = self.tables.lock().await;
        if let Some(line) = tables
            .order_items
            .iter_mut()
            .find(|line| line.order_id == order_id && line.item_id == item_id)
        {
            line.quantity += 1;
            return Ok(line.clone());
        }

        let line = OrderItemEntity {
            id: tables.next_id(),
            user_id,
            order_id,
            item_id,
            quantity: 1,
            ordered: false,
        };
        tables.order_items.push(line.clone());
        Ok(line)
    }

    async fn set_order_item_quantity(&self, id: i32, quantity: i32) -> Result<OrderItemEntity> {
        let mut tables = self.tables.lock().await;
        let line = tables
            .order_items
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or_else(|| anyhow!("order item {id} does not exist"))?;
        line.quantity = quantity;
        Ok(line.clone())
    }

    async fn delete_order_item(&self, id: i32) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.order_items.retain(|line| line.id != id);
        Ok(())
    }

    async fn find_coupon_by_code(&self, code: &str) -> Result<Option<CouponEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables.coupons.iter().find(|coupon| coupon.code == code).cloned())
    }

    async fn get_coupons(&self, ids: &[i32]) -> Result<Vec<CouponEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .coupons
            .iter()
            .filter(|coupon| ids.contains(&coupon.id))
            .cloned()
            .collect())
    }

    async fn set_order_coupon(&self, order_id: i32, coupon_id: i32) -> Result<OrderEntity> {
        let mut tables = self.tables.lock().await;
        let order = tables
            .orders
            .iter_mut()
            .find(|order| order.id == order_id)
            .ok_or_else(|| anyhow!("order {order_id} does not exist"))?;
        order.coupon_id = Some(coupon_id);
        Ok(order.clone())
    }

    async fn finalize_order(
        &self,
        finalize: FinalizeOrder,
    ) -> Result<Option<(OrderEntity, PaymentEntity)>> {
        let mut tables = self.tables.lock().await;
        if !tables
            .orders
            .iter()
            .any(|order| order.id == finalize.order_id && !order.ordered)
        {
            return Ok(None);
        }

        let payment = PaymentEntity {
            id: tables.next_id(),
            user_id: finalize.payment.user_id,
            stripe_charge_id: finalize.payment.stripe_charge_id,
            amount: finalize.payment.amount,
            created_at: finalize.ordered_date,
        };
        tables.payments.push(payment.clone());

        for line in tables
            .order_items
            .iter_mut()
            .filter(|line| line.order_id == finalize.order_id)
        {
            line.ordered = true;
        }

        let order = tables
            .orders
            .iter_mut()
            .find(|order| order.id == finalize.order_id)
            .ok_or_else(|| anyhow!("order {} does not exist", finalize.order_id))?;
        order.ordered = true;
        order.ordered_date = Some(finalize.ordered_date);
        order.payment_id = Some(payment.id);
        order.billing_address_id = Some(finalize.billing_address_id);
        order.shipping_address_id = Some(finalize.shipping_address_id);
        order.ref_code = Some(finalize.ref_code);

        Ok(Some((order.clone(), payment)))
    }

    async fn create_refund(&self, refund: CreateRefundEntity) -> Result<Option<RefundEntity>> {
        let mut tables = self.tables.lock().await;
        let order = tables
            .orders
            .iter_mut()
            .find(|order| order.id == refund.order_id)
            .ok_or_else(|| anyhow!("order {} does not exist", refund.order_id))?;
        if order.refund_requested {
            return Ok(None);
        }
        order.refund_requested = true;

        let refund = RefundEntity {
            id: tables.next_id(),
            order_id: refund.order_id,
            reason: refund.reason,
            accepted: false,
            email: refund.email,
            created_at: Utc::now(),
        };
        tables.refunds.push(refund.clone());
        Ok(Some(refund))
    }

    async fn list_addresses(
        &self,
        user_id: i32,
        address_type: Option<AddressType>,
    ) -> Result<Vec<AddressEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .addresses
            .iter()
            .filter(|address| address.user_id == user_id)
            .filter(|address| {
                address_type.is_none_or(|address_type| address.address_type == address_type.code())
            })
            .cloned()
            .collect())
    }

    async fn get_address(&self, user_id: i32, id: i32) -> Result<Option<AddressEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .addresses
            .iter()
            .find(|address| address.id == id && address.user_id == user_id)
            .cloned())
    }

    async fn create_address(&self, address: CreateAddressEntity) -> Result<AddressEntity> {
        let mut tables = self.tables.lock().await;
        let address = AddressEntity {
            id: tables.next_id(),
            user_id: address.user_id,
            street_address: address.street_address,
            apartment_address: address.apartment_address,
            country: address.country,
            zip: address.zip,
            address_type: address.address_type,
            is_default: address.is_default,
        };
        tables.addresses.push(address.clone());
        Ok(address)
    }

    async fn update_address(
        &self,
        user_id: i32,
        id: i32,
        changes: UpdateAddressEntity,
    ) -> Result<Option<AddressEntity>> {
        let mut tables = self.tables.lock().await;
        let Some(address) = tables
            .addresses
            .iter_mut()
            .find(|address| address.id == id && address.user_id == user_id)
        else {
            return Ok(None);
        };

        address.street_address = changes.street_address;
        address.apartment_address = changes.apartment_address;
        address.country = changes.country;
        address.zip = changes.zip;
        address.address_type = changes.address_type;
        address.is_default = changes.is_default;
        Ok(Some(address.clone()))
    }

    async fn delete_address(&self, user_id: i32, id: i32) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.addresses.len();
        tables
            .addresses
            .retain(|address| !(address.id == id && address.user_id == user_id));
        Ok(tables.addresses.len() < before)
    }

    async fn clear_default_addresses(
        &self,
        user_id: i32,
        address_type: AddressType,
    ) -> Result<()> {
        let mut tables = self.tables.lock().await;
        for address in tables.addresses.iter_mut().filter(|address| {
            address.user_id == user_id && address.address_type == address_type.code()
        }) {
            address.is_default = false;
        }
        Ok(())
    }

    async fn get_or_create_profile(&self, user_id: i32) -> Result<UserProfileEntity> {
        let mut tables = self.tables.lock().await;
        if let Some(profile) = tables.profiles.iter().find(|p| p.user_id == user_id) {
            return Ok(profile.clone());
        }

        let profile = UserProfileEntity {
            user_id,
            stripe_customer_id: None,
            one_click_purchasing: false,
        };
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn set_stripe_customer_id(
        &self,
        user_id: i32,
        customer_id: &str,
    ) -> Result<UserProfileEntity> {
        let mut tables = self.tables.lock().await;
        let profile = tables
            .profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or_else(|| anyhow!("profile for user {user_id} does not exist"))?;
        profile.stripe_customer_id = Some(customer_id.to_string());
        profile.one_click_purchasing = true;
        Ok(profile.clone())
    }

    async fn list_payments(&self, user_id: i32) -> Result<Vec<PaymentEntity>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .payments
            .iter()
            .rev()
            .filter(|payment| payment.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_saved_items(&self, user_id: i32) -> Result<Vec<(SavedItemEntity, ItemEntity)>> {
        let tables = self.tables.lock().await;
        tables
            .saved_items
            .iter()
            .rev()
            .filter(|saved| saved.user_id == user_id)
            .map(|saved| Ok((saved.clone(), tables.item(saved.item_id)?)))
            .collect()
    }

    async fn save_item(&self, user_id: i32, item_id: i32) -> Result<SavedItemEntity> {
        let mut tables = self.tables.lock().await;
        if let Some(saved) = tables
            .saved_items
            .iter()
            .find(|saved| saved.user_id == user_id && saved.item_id == item_id)
        {
            return Ok(saved.clone());
        }

        let saved = SavedItemEntity {
            id: tables.next_id(),
            user_id,
            item_id,
            created_at: Utc::now(),
        };
        tables.saved_items.push(saved.clone());
        Ok(saved)
    }

    async fn delete_saved_item(&self, user_id: i32, id: i32) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.saved_items.len();
        tables
            .saved_items
            .retain(|saved| !(saved.id == id && saved.user_id == user_id));
        Ok(tables.saved_items.len() < before)
    }
}
