use axum::{Extension, extract::State, response::IntoResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app::{
        error::{AppError, StdResponse},
        extract::Json,
        middleware::{self, CurrentUser},
        state::AppState,
    },
    responses::OrderRes,
    services::cart,
};

/// Active order, order history and coupons.
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_active_order))
        .routes(utoipa_axum::routes!(get_order_history))
        .routes(utoipa_axum::routes!(apply_coupon))
        .route_layer(axum::middleware::from_fn(middleware::require_user))
}

#[utoipa::path(
    get,
    path = "/order",
    tags = ["Orders"],
    responses(
        (status = 200, description = "The active order with lines and total", body = StdResponse<OrderRes, String>),
        (status = 404, description = "No active order")
    )
)]
pub async fn get_active_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let summary = cart::order_summary(state.store.as_ref(), user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(cart::CartError::NoActiveOrder.to_string()))?;

    Ok(StdResponse {
        data: Some(OrderRes::from(summary)),
        message: Some("Order fetched successfully"),
    })
}

/// Placed orders, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    tags = ["Orders"],
    responses(
        (status = 200, description = "Order history", body = StdResponse<Vec<OrderRes>, String>)
    )
)]
pub async fn get_order_history(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let orders = cart::order_history(state.store.as_ref(), user.id).await?;

    Ok(StdResponse {
        data: Some(orders.into_iter().map(OrderRes::from).collect::<Vec<_>>()),
        message: Some("Orders fetched successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
pub struct CouponReq {
    #[serde(default)]
    code: Option<String>,
}

#[utoipa::path(
    post,
    path = "/coupon",
    tags = ["Orders"],
    request_body = CouponReq,
    responses(
        (status = 200, description = "Coupon applied", body = StdResponse<OrderRes, String>),
        (status = 400, description = "Missing or unknown code, or no active order")
    )
)]
pub async fn apply_coupon(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CouponReq>,
) -> Result<impl IntoResponse, AppError> {
    let code = req.code.unwrap_or_default();
    cart::apply_coupon(state.store.as_ref(), user.id, &code).await?;
    let summary = cart::order_summary(state.store.as_ref(), user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(cart::CartError::NoActiveOrder.to_string()))?;

    Ok(StdResponse {
        data: Some(OrderRes::from(summary)),
        message: Some("Coupon applied successfully"),
    })
}
