//! Identity forwarded by the upstream gateway.
//!
//! Every authenticated route sits behind [`require_user`], which turns the
//! `x-user-id` / `x-username` / `x-user-email` headers into a [`CurrentUser`]
//! request extension.

use axum::{
    body::Body,
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USERNAME_HEADER: &str = "x-username";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
}

impl CurrentUser {
    pub fn from_headers(headers: &HeaderMap) -> Option<CurrentUser> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let id = header(USER_ID_HEADER)?.parse().ok()?;
        let username = header(USERNAME_HEADER)?.to_string();
        let email = header(USER_EMAIL_HEADER).map(str::to_string);

        Some(CurrentUser {
            id,
            username,
            email,
        })
    }
}

pub async fn require_user(mut request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let Some(user) = CurrentUser::from_headers(request.headers()) else {
        tracing::debug!("Rejected request without a forwarded identity");
        return Err(AppError::Unauthorized);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
