use axum::{Extension, extract::State, response::IntoResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app::{
        error::{AppError, StdResponse},
        extract::{Json, Path},
        middleware::{self, CurrentUser},
        state::AppState,
    },
    responses::SavedItemRes,
    services::saved,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest(
        "/saved-for-later",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(list_saved_items, save_item))
            .routes(utoipa_axum::routes!(delete_saved_item))
            .route_layer(axum::middleware::from_fn(middleware::require_user)),
    )
}

#[utoipa::path(
    get,
    path = "/",
    tags = ["Saved for later"],
    responses(
        (status = 200, description = "Items the user saved for later", body = StdResponse<Vec<SavedItemRes>, String>)
    )
)]
pub async fn list_saved_items(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let items = saved::list_saved(state.store.as_ref(), user.id).await?;

    Ok(StdResponse {
        data: Some(items.into_iter().map(SavedItemRes::from).collect::<Vec<_>>()),
        message: Some("Saved items fetched successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
pub struct SaveItemReq {
    #[serde(default)]
    slug: Option<String>,
}

#[utoipa::path(
    post,
    path = "/",
    tags = ["Saved for later"],
    request_body = SaveItemReq,
    responses(
        (status = 200, description = "Item saved", body = StdResponse<SavedItemRes, String>),
        (status = 400, description = "Missing or unknown slug")
    )
)]
pub async fn save_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<SaveItemReq>,
) -> Result<impl IntoResponse, AppError> {
    let slug = req.slug.unwrap_or_default();
    let saved = saved::save_for_later(state.store.as_ref(), user.id, &slug).await?;

    Ok(StdResponse {
        data: Some(SavedItemRes::from(saved)),
        message: Some("Item saved for later"),
    })
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tags = ["Saved for later"],
    params(
        ("id" = i32, Path, description = "Saved item ID")
    ),
    responses(
        (status = 200, description = "Saved item removed", body = StdResponse<String, String>),
        (status = 404, description = "No such saved item of the user")
    )
)]
pub async fn delete_saved_item(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    saved::remove_saved(state.store.as_ref(), user.id, id).await?;

    Ok(StdResponse::<(), _> {
        data: None,
        message: Some("Saved item removed"),
    })
}
