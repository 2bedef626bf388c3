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
    responses::RefundRes,
    services::refunds,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(request_refund))
        .route_layer(axum::middleware::from_fn(middleware::require_user))
}

#[derive(Deserialize, ToSchema)]
pub struct RefundReq {
    #[serde(default)]
    ref_code: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    email: String,
}

/// Ask for a refund of a placed order.
#[utoipa::path(
    post,
    path = "/refunds",
    tags = ["Refunds"],
    request_body = RefundReq,
    responses(
        (status = 200, description = "Refund requested", body = StdResponse<RefundRes, String>),
        (status = 400, description = "Missing field"),
        (status = 404, description = "No placed order with that reference code")
    )
)]
pub async fn request_refund(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<RefundReq>,
) -> Result<impl IntoResponse, AppError> {
    let refund = refunds::request_refund(
        state.store.as_ref(),
        user.id,
        &req.ref_code,
        &req.reason,
        &req.email,
    )
    .await?;

    Ok(StdResponse {
        data: Some(RefundRes::from(refund)),
        message: Some("Your request was received"),
    })
}
