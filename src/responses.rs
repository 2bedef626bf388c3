//! JSON shapes returned by the HTTP layer, with conversions from the domain
//! types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{
        AddressEntity, CommentEntity, CouponEntity, ItemEntity, OrderItemEntity, PaymentEntity,
        RatingEntity, RefundEntity, SavedItemEntity,
    },
    services::{
        browse::{ItemPage, RatedItem},
        cart::{OrderSummary, line_amount_saved, line_final_price},
        checkout::PlacedOrder,
    },
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemRes {
    pub id: i32,
    pub title: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    /// Display name of the genre.
    pub genre: String,
    pub genre_code: String,
    /// Display name of the label.
    pub label: String,
    pub slug: String,
    pub description: String,
    pub image: String,
    pub publisher_info: Option<String>,
    pub author_bio: Option<String>,
    pub author_name: Option<String>,
    pub avg_rating: Option<f64>,
    pub release_date: DateTime<Utc>,
}

impl ItemRes {
    pub fn new(item: ItemEntity, avg_rating: Option<f64>) -> Self {
        let genre = item
            .genre()
            .map(|genre| genre.label.to_string())
            .unwrap_or_else(|| item.genre.clone());
        let label = item
            .label()
            .map(|label| label.display().to_string())
            .unwrap_or_else(|| item.label.clone());

        ItemRes {
            id: item.id,
            title: item.title,
            price: item.price,
            discount_price: item.discount_price,
            genre,
            genre_code: item.genre,
            label,
            slug: item.slug,
            description: item.description,
            image: item.image,
            publisher_info: item.publisher_info,
            author_bio: item.author_bio,
            author_name: item.author_name,
            avg_rating,
            release_date: item.release_date,
        }
    }
}

impl From<RatedItem> for ItemRes {
    fn from(rated: RatedItem) -> Self {
        ItemRes::new(rated.item, rated.avg_rating)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemPageRes {
    pub count: i64,
    pub page: i64,
    pub page_size: i64,
    pub results: Vec<ItemRes>,
}

impl From<ItemPage> for ItemPageRes {
    fn from(page: ItemPage) -> Self {
        ItemPageRes {
            count: page.count,
            page: page.page,
            page_size: page.page_size,
            results: page.results.into_iter().map(ItemRes::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CouponRes {
    pub id: i32,
    pub code: String,
    pub amount: f64,
}

impl From<CouponEntity> for CouponRes {
    fn from(coupon: CouponEntity) -> Self {
        CouponRes {
            id: coupon.id,
            code: coupon.code,
            amount: coupon.amount,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemRes {
    pub id: i32,
    /// Title of the item.
    pub item: String,
    pub item_obj: ItemRes,
    pub quantity: i32,
    pub final_price: f64,
    pub amount_saved: f64,
}

impl From<(OrderItemEntity, ItemEntity)> for OrderItemRes {
    fn from((line, item): (OrderItemEntity, ItemEntity)) -> Self {
        let final_price = line_final_price(&line, &item);
        let amount_saved = line_amount_saved(&line, &item);
        OrderItemRes {
            id: line.id,
            item: item.title.clone(),
            item_obj: ItemRes::new(item, None),
            quantity: line.quantity,
            final_price,
            amount_saved,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderRes {
    pub id: i32,
    pub ref_code: Option<String>,
    pub ordered: bool,
    pub ordered_date: Option<DateTime<Utc>>,
    pub order_items: Vec<OrderItemRes>,
    pub total: f64,
    pub coupon: Option<CouponRes>,
    pub refund_requested: bool,
}

impl From<OrderSummary> for OrderRes {
    fn from(summary: OrderSummary) -> Self {
        OrderRes {
            id: summary.order.id,
            ref_code: summary.order.ref_code,
            ordered: summary.order.ordered,
            ordered_date: summary.order.ordered_date,
            order_items: summary.lines.into_iter().map(OrderItemRes::from).collect(),
            total: summary.total,
            coupon: summary.coupon.map(CouponRes::from),
            refund_requested: summary.order.refund_requested,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddressRes {
    pub id: i32,
    pub user: i32,
    pub street_address: String,
    pub apartment_address: String,
    pub country: String,
    pub zip: String,
    pub address_type: String,
    pub default: bool,
}

impl From<AddressEntity> for AddressRes {
    fn from(address: AddressEntity) -> Self {
        AddressRes {
            id: address.id,
            user: address.user_id,
            street_address: address.street_address,
            apartment_address: address.apartment_address,
            country: address.country,
            zip: address.zip,
            address_type: address.address_type,
            default: address.is_default,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentRes {
    pub id: i32,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<PaymentEntity> for PaymentRes {
    fn from(payment: PaymentEntity) -> Self {
        PaymentRes {
            id: payment.id,
            amount: payment.amount,
            timestamp: payment.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutRes {
    pub order_id: i32,
    pub ref_code: Option<String>,
    pub payment: PaymentRes,
}

impl From<PlacedOrder> for CheckoutRes {
    fn from(placed: PlacedOrder) -> Self {
        CheckoutRes {
            order_id: placed.order.id,
            ref_code: placed.order.ref_code,
            payment: placed.payment.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentRes {
    pub id: i32,
    pub user: i32,
    pub username: String,
    pub item: i32,
    pub book_title: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<CommentEntity> for CommentRes {
    fn from(comment: CommentEntity) -> Self {
        CommentRes {
            id: comment.id,
            user: comment.user_id,
            username: comment.username,
            item: comment.item_id,
            book_title: comment.book_title,
            content: comment.content,
            timestamp: comment.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingRes {
    pub id: i32,
    pub user: i32,
    pub username: String,
    pub item: i32,
    pub book_title: String,
    pub rating: i32,
    pub timestamp: DateTime<Utc>,
}

impl From<RatingEntity> for RatingRes {
    fn from(rating: RatingEntity) -> Self {
        RatingRes {
            id: rating.id,
            user: rating.user_id,
            username: rating.username,
            item: rating.item_id,
            book_title: rating.book_title,
            rating: rating.rating,
            timestamp: rating.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SavedItemRes {
    pub id: i32,
    pub user: i32,
    pub saved_at: DateTime<Utc>,
    pub item: ItemRes,
}

impl From<(SavedItemEntity, ItemEntity)> for SavedItemRes {
    fn from((saved, item): (SavedItemEntity, ItemEntity)) -> Self {
        SavedItemRes {
            id: saved.id,
            user: saved.user_id,
            saved_at: saved.created_at,
            item: ItemRes::new(item, None),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefundRes {
    pub id: i32,
    pub order_id: i32,
    pub reason: String,
    pub accepted: bool,
    pub email: String,
}

impl From<RefundEntity> for RefundRes {
    fn from(refund: RefundEntity) -> Self {
        RefundRes {
            id: refund.id,
            order_id: refund.order_id,
            reason: refund.reason,
            accepted: refund.accepted,
            email: refund.email,
        }
    }
}
