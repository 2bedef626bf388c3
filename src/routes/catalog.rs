use axum::{extract::State, response::IntoResponse};
use serde::Deserialize;
use utoipa::IntoParams;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app::{
        error::{AppError, StdResponse},
        extract::{Path, Query},
        state::AppState,
    },
    responses::{ItemPageRes, ItemRes},
    services::browse::{self, BrowseQuery},
};

/// Public catalog routes.
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(list_items))
        .routes(utoipa_axum::routes!(get_item))
        .routes(utoipa_axum::routes!(browse_items))
        .routes(utoipa_axum::routes!(list_author_items))
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-based page number.
    page: Option<i64>,
}

/// Paginated catalog listing.
#[utoipa::path(
    get,
    path = "/items",
    tags = ["Catalog"],
    params(PageParams),
    responses(
        (status = 200, description = "One page of items", body = StdResponse<ItemPageRes, String>),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_items(
    Query(params): Query<PageParams>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let page = browse::list_items(
        state.store.as_ref(),
        params.page,
        state.config.catalog.page_size,
    )
    .await?;

    Ok(StdResponse {
        data: Some(ItemPageRes::from(page)),
        message: Some("Items fetched successfully"),
    })
}

#[utoipa::path(
    get,
    path = "/items/{id}",
    tags = ["Catalog"],
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "The item", body = StdResponse<ItemRes, String>),
        (status = 404, description = "No such item")
    )
)]
pub async fn get_item(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let item = browse::get_item(state.store.as_ref(), id).await?;

    Ok(StdResponse {
        data: Some(ItemRes::from(item)),
        message: Some("Item fetched successfully"),
    })
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BrowseParams {
    /// Genre code, or `null` for every genre.
    #[serde(rename = "browseBy")]
    browse_by: Option<String>,
    /// One of `author_name`, `price`, `release_date`, `rating`, or `null`.
    #[serde(rename = "sortBy")]
    sort_by: Option<String>,
}

/// Filter the catalog by genre and sort it.
#[utoipa::path(
    get,
    path = "/browse",
    tags = ["Catalog"],
    params(BrowseParams),
    responses(
        (status = 200, description = "Matching items in order", body = StdResponse<Vec<ItemRes>, String>),
        (status = 400, description = "Unknown genre or sort key")
    )
)]
pub async fn browse_items(
    Query(params): Query<BrowseParams>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let query = BrowseQuery::parse(params.browse_by.as_deref(), params.sort_by.as_deref())?;
    let items = browse::browse(state.store.as_ref(), query).await?;

    Ok(StdResponse {
        data: Some(items.into_iter().map(ItemRes::from).collect::<Vec<_>>()),
        message: Some("Items fetched successfully"),
    })
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuthorParams {
    author_name: Option<String>,
}

/// Items by one author, or the whole catalog when no author is given.
#[utoipa::path(
    get,
    path = "/authors",
    tags = ["Catalog"],
    params(AuthorParams),
    responses(
        (status = 200, description = "Items by the author", body = StdResponse<Vec<ItemRes>, String>)
    )
)]
pub async fn list_author_items(
    Query(params): Query<AuthorParams>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let items = browse::items_by_author(state.store.as_ref(), params.author_name.as_deref()).await?;

    Ok(StdResponse {
        data: Some(items.into_iter().map(ItemRes::from).collect::<Vec<_>>()),
        message: Some("Items fetched successfully"),
    })
}
