use axum::{Extension, extract::State, response::IntoResponse};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app::{
        error::{AppError, StdResponse},
        extract::{Json, Path, Query},
        middleware::{self, CurrentUser},
        state::AppState,
    },
    reference::AddressType,
    responses::AddressRes,
    services::addresses::{self, AddressInput},
};

/// Address book of the authenticated user.
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest(
        "/addresses",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(list_addresses, create_address))
            .routes(utoipa_axum::routes!(update_address, delete_address))
            .route_layer(axum::middleware::from_fn(middleware::require_user)),
    )
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddressTypeParams {
    /// `B` for billing or `S` for shipping.
    address_type: Option<AddressType>,
}

#[derive(Deserialize, ToSchema)]
pub struct AddressReq {
    street_address: String,
    #[serde(default)]
    apartment_address: String,
    /// ISO 3166-1 alpha-2 code.
    country: String,
    zip: String,
    address_type: AddressType,
    #[serde(default)]
    default: bool,
}

impl From<AddressReq> for AddressInput {
    fn from(req: AddressReq) -> Self {
        AddressInput {
            street_address: req.street_address,
            apartment_address: req.apartment_address,
            country: req.country,
            zip: req.zip,
            address_type: req.address_type,
            default: req.default,
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    tags = ["Addresses"],
    params(AddressTypeParams),
    responses(
        (status = 200, description = "The user's addresses", body = StdResponse<Vec<AddressRes>, String>)
    )
)]
pub async fn list_addresses(
    Query(params): Query<AddressTypeParams>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let addresses =
        addresses::list_addresses(state.store.as_ref(), user.id, params.address_type).await?;

    Ok(StdResponse {
        data: Some(addresses.into_iter().map(AddressRes::from).collect::<Vec<_>>()),
        message: Some("Addresses fetched successfully"),
    })
}

#[utoipa::path(
    post,
    path = "/",
    tags = ["Addresses"],
    request_body = AddressReq,
    responses(
        (status = 200, description = "Address created", body = StdResponse<AddressRes, String>),
        (status = 400, description = "Invalid address")
    )
)]
pub async fn create_address(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<AddressReq>,
) -> Result<impl IntoResponse, AppError> {
    let address = addresses::create_address(state.store.as_ref(), user.id, req.into()).await?;

    Ok(StdResponse {
        data: Some(AddressRes::from(address)),
        message: Some("Address created successfully"),
    })
}

#[utoipa::path(
    put,
    path = "/{id}",
    tags = ["Addresses"],
    params(
        ("id" = i32, Path, description = "Address ID")
    ),
    request_body = AddressReq,
    responses(
        (status = 200, description = "Address updated", body = StdResponse<AddressRes, String>),
        (status = 400, description = "Invalid address"),
        (status = 404, description = "No such address of the user")
    )
)]
pub async fn update_address(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<AddressReq>,
) -> Result<impl IntoResponse, AppError> {
    let address =
        addresses::update_address(state.store.as_ref(), user.id, id, req.into()).await?;

    Ok(StdResponse {
        data: Some(AddressRes::from(address)),
        message: Some("Address updated successfully"),
    })
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tags = ["Addresses"],
    params(
        ("id" = i32, Path, description = "Address ID")
    ),
    responses(
        (status = 200, description = "Address deleted", body = StdResponse<String, String>),
        (status = 404, description = "No such address of the user")
    )
)]
pub async fn delete_address(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    addresses::delete_address(state.store.as_ref(), user.id, id).await?;

    Ok(StdResponse::<(), _> {
        data: None,
        message: Some("Address deleted successfully"),
    })
}
