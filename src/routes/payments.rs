use axum::{Extension, extract::State, response::IntoResponse};
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app::{
        error::{AppError, StdResponse},
        middleware::{self, CurrentUser},
        state::AppState,
    },
    responses::PaymentRes,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(list_payments))
        .route_layer(axum::middleware::from_fn(middleware::require_user))
}

/// Payments made by the authenticated user, newest first.
#[utoipa::path(
    get,
    path = "/payments",
    tags = ["Payments"],
    responses(
        (status = 200, description = "Payment history", body = StdResponse<Vec<PaymentRes>, String>)
    )
)]
pub async fn list_payments(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let payments = state.store.list_payments(user.id).await?;

    Ok(StdResponse {
        data: Some(payments.into_iter().map(PaymentRes::from).collect::<Vec<_>>()),
        message: Some("Payments fetched successfully"),
    })
}
