use axum::response::IntoResponse;
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app::{error::StdResponse, state::AppState},
    reference::{COUNTRIES, GENRES},
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(list_genres))
        .routes(utoipa_axum::routes!(list_countries))
}

#[derive(Serialize, ToSchema)]
pub struct GenreRes {
    code: &'static str,
    label: &'static str,
}

#[derive(Serialize, ToSchema)]
pub struct CountryRes {
    code: &'static str,
    name: &'static str,
}

#[utoipa::path(
    get,
    path = "/genres",
    tags = ["Reference"],
    responses(
        (status = 200, description = "Every genre code with its label", body = StdResponse<Vec<GenreRes>, String>)
    )
)]
pub async fn list_genres() -> impl IntoResponse {
    let genres: Vec<GenreRes> = GENRES
        .iter()
        .map(|genre| GenreRes {
            code: genre.code,
            label: genre.label,
        })
        .collect();

    StdResponse {
        data: Some(genres),
        message: Some("Genres fetched successfully"),
    }
}

#[utoipa::path(
    get,
    path = "/countries",
    tags = ["Reference"],
    responses(
        (status = 200, description = "ISO 3166-1 countries", body = StdResponse<Vec<CountryRes>, String>)
    )
)]
pub async fn list_countries() -> impl IntoResponse {
    let countries: Vec<CountryRes> = COUNTRIES
        .iter()
        .map(|&(code, name)| CountryRes { code, name })
        .collect();

    StdResponse {
        data: Some(countries),
        message: Some("Countries fetched successfully"),
    }
}
