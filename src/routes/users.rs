use axum::{Extension, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::app::{
    error::StdResponse,
    middleware::{self, CurrentUser},
    state::AppState,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(whoami))
        .route_layer(axum::middleware::from_fn(middleware::require_user))
}

#[derive(Serialize, ToSchema)]
pub struct WhoAmIRes {
    #[serde(rename = "userID")]
    user_id: i32,
    username: String,
}

/// Identity of the caller as forwarded by the gateway.
#[utoipa::path(
    get,
    path = "/whoami",
    tags = ["Users"],
    responses(
        (status = 200, description = "The caller", body = StdResponse<WhoAmIRes, String>),
        (status = 401, description = "No forwarded identity")
    )
)]
pub async fn whoami(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    StdResponse {
        data: Some(WhoAmIRes {
            user_id: user.id,
            username: user.username,
        }),
        message: None::<String>,
    }
}
