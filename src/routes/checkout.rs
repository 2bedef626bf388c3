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
    responses::CheckoutRes,
    services::checkout::{self, CheckoutRequest},
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(checkout_order))
        .route_layer(axum::middleware::from_fn(middleware::require_user))
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReq {
    #[serde(default)]
    stripe_token: Option<String>,
    #[serde(default)]
    selected_billing_address: Option<i32>,
    #[serde(default)]
    selected_shipping_address: Option<i32>,
}

/// Charge the active order and place it.
#[utoipa::path(
    post,
    path = "/checkout",
    tags = ["Checkout"],
    request_body = CheckoutReq,
    responses(
        (status = 200, description = "Order placed", body = StdResponse<CheckoutRes, String>),
        (status = 400, description = "Invalid data or payment failure"),
        (status = 404, description = "No active order or unknown address")
    )
)]
pub async fn checkout_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CheckoutReq>,
) -> Result<impl IntoResponse, AppError> {
    let placed = checkout::checkout(
        state.store.as_ref(),
        state.payments.as_ref(),
        &state.config.stripe.currency,
        &user,
        CheckoutRequest {
            stripe_token: req.stripe_token,
            billing_address_id: req.selected_billing_address,
            shipping_address_id: req.selected_shipping_address,
        },
    )
    .await?;

    Ok(StdResponse {
        data: Some(CheckoutRes::from(placed)),
        message: Some("Your order was successful!"),
    })
}
