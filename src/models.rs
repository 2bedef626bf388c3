use chrono::{DateTime, Utc};
use diesel::{
    Selectable,
    prelude::{AsChangeset, Identifiable, Insertable, Queryable},
};

use crate::reference::{AddressType, BookLabel, Genre};

// Catalog

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ItemEntity {
    pub id: i32,
    pub title: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub genre: String,
    pub label: String,
    pub slug: String,
    pub description: String,
    pub image: String,
    pub publisher_info: Option<String>,
    pub author_name: Option<String>,
    pub author_bio: Option<String>,
    pub release_date: DateTime<Utc>,
}

impl ItemEntity {
    pub fn genre(&self) -> Option<Genre> {
        Genre::from_code(&self.genre)
    }

    pub fn label(&self) -> Option<BookLabel> {
        BookLabel::from_code(&self.label)
    }

    /// Unit price after any discount.
    pub fn unit_price(&self) -> f64 {
        self.discount_price.unwrap_or(self.price)
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateItemEntity {
    pub title: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub genre: String,
    pub label: String,
    pub slug: String,
    pub description: String,
    pub image: String,
    pub publisher_info: Option<String>,
    pub author_name: Option<String>,
    pub author_bio: Option<String>,
    pub release_date: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentEntity {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub item_id: i32,
    pub book_title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateCommentEntity {
    pub user_id: i32,
    pub username: String,
    pub item_id: i32,
    pub book_title: String,
    pub content: String,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RatingEntity {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub item_id: i32,
    pub book_title: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateRatingEntity {
    pub user_id: i32,
    pub username: String,
    pub item_id: i32,
    pub book_title: String,
    pub rating: i32,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::saved_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SavedItemEntity {
    pub id: i32,
    pub user_id: i32,
    pub item_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::saved_items)]
pub struct CreateSavedItemEntity {
    pub user_id: i32,
    pub item_id: i32,
}

// Orders

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub id: i32,
    pub user_id: i32,
    pub ref_code: Option<String>,
    pub start_date: DateTime<Utc>,
    pub ordered_date: Option<DateTime<Utc>>,
    pub ordered: bool,
    pub billing_address_id: Option<i32>,
    pub shipping_address_id: Option<i32>,
    pub payment_id: Option<i32>,
    pub coupon_id: Option<i32>,
    pub being_delivered: bool,
    pub received: bool,
    pub refund_requested: bool,
    pub refund_granted: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateOrderEntity {
    pub user_id: i32,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemEntity {
    pub id: i32,
    pub user_id: i32,
    pub order_id: i32,
    pub item_id: i32,
    pub quantity: i32,
    pub ordered: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateOrderItemEntity {
    pub user_id: i32,
    pub order_id: i32,
    pub item_id: i32,
    pub quantity: i32,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::coupons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CouponEntity {
    pub id: i32,
    pub code: String,
    pub amount: f64,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PaymentEntity {
    pub id: i32,
    pub user_id: i32,
    pub stripe_charge_id: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreatePaymentEntity {
    pub user_id: i32,
    pub stripe_charge_id: String,
    pub amount: f64,
}

/// Everything written when a charged cart turns into a placed order.
#[derive(Debug, Clone)]
pub struct FinalizeOrder {
    pub order_id: i32,
    pub payment: CreatePaymentEntity,
    pub billing_address_id: i32,
    pub shipping_address_id: i32,
    pub ref_code: String,
    pub ordered_date: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::refunds)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RefundEntity {
    pub id: i32,
    pub order_id: i32,
    pub reason: String,
    pub accepted: bool,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::refunds)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateRefundEntity {
    pub order_id: i32,
    pub reason: String,
    pub email: String,
}

// Address book & profiles

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::addresses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AddressEntity {
    pub id: i32,
    pub user_id: i32,
    pub street_address: String,
    pub apartment_address: String,
    pub country: String,
    pub zip: String,
    pub address_type: String,
    pub is_default: bool,
}

impl AddressEntity {
    pub fn address_type(&self) -> Option<AddressType> {
        AddressType::from_code(&self.address_type)
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::addresses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateAddressEntity {
    pub user_id: i32,
    pub street_address: String,
    pub apartment_address: String,
    pub country: String,
    pub zip: String,
    pub address_type: String,
    pub is_default: bool,
}

#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::addresses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateAddressEntity {
    pub street_address: String,
    pub apartment_address: String,
    pub country: String,
    pub zip: String,
    pub address_type: String,
    pub is_default: bool,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(primary_key(user_id))]
#[diesel(table_name = crate::schema::user_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserProfileEntity {
    pub user_id: i32,
    pub stripe_customer_id: Option<String>,
    pub one_click_purchasing: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::user_profiles)]
pub struct CreateUserProfileEntity {
    pub user_id: i32,
}
