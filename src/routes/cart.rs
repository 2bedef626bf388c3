use axum::{Extension, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app::{
        error::{AppError, StdResponse},
        extract::{Json, Path},
        middleware::{self, CurrentUser},
        state::AppState,
    },
    services::cart,
};

/// Cart mutation routes for the authenticated user.
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest(
        "/cart",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(add_to_cart))
            .routes(utoipa_axum::routes!(decrement_item))
            .routes(utoipa_axum::routes!(remove_order_item))
            .route_layer(axum::middleware::from_fn(middleware::require_user)),
    )
}

#[derive(Deserialize, ToSchema)]
pub struct SlugReq {
    #[serde(default)]
    slug: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CartLineRes {
    order_item_id: i32,
    order_id: i32,
    quantity: i32,
}

/// Add one unit of an item to the active cart, creating the cart if needed.
#[utoipa::path(
    post,
    path = "/add",
    tags = ["Cart"],
    request_body = SlugReq,
    responses(
        (status = 200, description = "Item added", body = StdResponse<CartLineRes, String>),
        (status = 400, description = "Missing or unknown slug")
    )
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<SlugReq>,
) -> Result<impl IntoResponse, AppError> {
    let slug = req.slug.unwrap_or_default();
    let line = cart::add_to_cart(state.store.as_ref(), user.id, &slug).await?;

    Ok(StdResponse {
        data: Some(CartLineRes {
            order_item_id: line.id,
            order_id: line.order_id,
            quantity: line.quantity,
        }),
        message: Some("Item added to cart"),
    })
}

/// Remove one unit of an item from the active cart.
#[utoipa::path(
    post,
    path = "/decrement",
    tags = ["Cart"],
    request_body = SlugReq,
    responses(
        (status = 200, description = "Quantity lowered or line removed", body = StdResponse<CartLineRes, String>),
        (status = 400, description = "Item not in cart or no active order")
    )
)]
pub async fn decrement_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<SlugReq>,
) -> Result<impl IntoResponse, AppError> {
    let slug = req.slug.unwrap_or_default();
    let line = cart::decrement_or_remove(state.store.as_ref(), user.id, &slug).await?;

    let message = if line.is_some() {
        "Item quantity updated"
    } else {
        "Item removed from cart"
    };
    Ok(StdResponse {
        data: line.map(|line| CartLineRes {
            order_item_id: line.id,
            order_id: line.order_id,
            quantity: line.quantity,
        }),
        message: Some(message),
    })
}

/// Drop a whole line from the active cart.
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tags = ["Cart"],
    params(
        ("id" = i32, Path, description = "Order item ID")
    ),
    responses(
        (status = 200, description = "Line removed", body = StdResponse<String, String>),
        (status = 404, description = "No such line in the user's cart")
    )
)]
pub async fn remove_order_item(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    cart::remove_order_item(state.store.as_ref(), user.id, id).await?;

    Ok(StdResponse::<(), _> {
        data: None,
        message: Some("Item removed from cart"),
    })
}
