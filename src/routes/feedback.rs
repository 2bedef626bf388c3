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
    responses::{CommentRes, RatingRes},
    services::feedback,
};

/// Comment and rating routes. Listing is public, writing requires a user.
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    let public = OpenApiRouter::new()
        .routes(utoipa_axum::routes!(list_comments))
        .routes(utoipa_axum::routes!(list_ratings));

    let authenticated = OpenApiRouter::new()
        .routes(utoipa_axum::routes!(create_comment))
        .routes(utoipa_axum::routes!(delete_comment))
        .routes(utoipa_axum::routes!(create_rating))
        .routes(utoipa_axum::routes!(delete_rating))
        .route_layer(axum::middleware::from_fn(middleware::require_user));

    public.merge(authenticated)
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookTitleParams {
    book_title: Option<String>,
}

#[utoipa::path(
    get,
    path = "/comments",
    tags = ["Feedback"],
    params(BookTitleParams),
    responses(
        (status = 200, description = "Comments, newest first", body = StdResponse<Vec<CommentRes>, String>)
    )
)]
pub async fn list_comments(
    Query(params): Query<BookTitleParams>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let comments = feedback::list_comments(state.store.as_ref(), params.book_title.as_deref()).await?;

    Ok(StdResponse {
        data: Some(comments.into_iter().map(CommentRes::from).collect::<Vec<_>>()),
        message: Some("Comments fetched successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
pub struct CreateCommentReq {
    item_id: i32,
    content: String,
}

#[utoipa::path(
    post,
    path = "/comments",
    tags = ["Feedback"],
    request_body = CreateCommentReq,
    responses(
        (status = 200, description = "Comment created", body = StdResponse<CommentRes, String>),
        (status = 400, description = "Empty comment"),
        (status = 404, description = "No such item")
    )
)]
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateCommentReq>,
) -> Result<impl IntoResponse, AppError> {
    let comment = feedback::add_comment(state.store.as_ref(), &user, req.item_id, &req.content).await?;

    Ok(StdResponse {
        data: Some(CommentRes::from(comment)),
        message: Some("Comment created successfully"),
    })
}

#[utoipa::path(
    delete,
    path = "/comments/{id}",
    tags = ["Feedback"],
    params(
        ("id" = i32, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = StdResponse<String, String>),
        (status = 404, description = "No such comment of the user")
    )
)]
pub async fn delete_comment(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    feedback::delete_comment(state.store.as_ref(), user.id, id).await?;

    Ok(StdResponse::<(), _> {
        data: None,
        message: Some("Comment deleted successfully"),
    })
}

#[utoipa::path(
    get,
    path = "/ratings",
    tags = ["Feedback"],
    params(BookTitleParams),
    responses(
        (status = 200, description = "Ratings, newest first", body = StdResponse<Vec<RatingRes>, String>)
    )
)]
pub async fn list_ratings(
    Query(params): Query<BookTitleParams>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let ratings = feedback::list_ratings(state.store.as_ref(), params.book_title.as_deref()).await?;

    Ok(StdResponse {
        data: Some(ratings.into_iter().map(RatingRes::from).collect::<Vec<_>>()),
        message: Some("Ratings fetched successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
pub struct CreateRatingReq {
    item_id: i32,
    /// Between 1 and 10.
    rating: i32,
}

#[utoipa::path(
    post,
    path = "/ratings",
    tags = ["Feedback"],
    request_body = CreateRatingReq,
    responses(
        (status = 200, description = "Rating created", body = StdResponse<RatingRes, String>),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "No such item")
    )
)]
pub async fn create_rating(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateRatingReq>,
) -> Result<impl IntoResponse, AppError> {
    let rating = feedback::add_rating(state.store.as_ref(), &user, req.item_id, req.rating).await?;

    Ok(StdResponse {
        data: Some(RatingRes::from(rating)),
        message: Some("Rating created successfully"),
    })
}

#[utoipa::path(
    delete,
    path = "/ratings/{id}",
    tags = ["Feedback"],
    params(
        ("id" = i32, Path, description = "Rating ID")
    ),
    responses(
        (status = 200, description = "Rating deleted", body = StdResponse<String, String>),
        (status = 404, description = "No such rating of the user")
    )
)]
pub async fn delete_rating(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    feedback::delete_rating(state.store.as_ref(), user.id, id).await?;

    Ok(StdResponse::<(), _> {
        data: None,
        message: Some("Rating deleted successfully"),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        store::memory::MemoryStore,
        test_support::{FakeGateway, authed, get, seed_item, send, test_app, test_user},
    };

    #[tokio::test]
    async fn test_listing_is_public_but_writing_is_not() {
        let store = Arc::new(MemoryStore::new());
        let item = seed_item(&store, "dune", 10.0, None, "SF").await;
        let app = test_app(store, Arc::new(FakeGateway::default()));

        let (status, _) = send(&app, get("/comments")).await;
        assert_eq!(status, StatusCode::OK);

        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/comments")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(
                json!({ "item_id": item.id, "content": "hi" }).to_string(),
            ))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rate_then_browse_shows_average() {
        let store = Arc::new(MemoryStore::new());
        let item = seed_item(&store, "dune", 10.0, None, "SF").await;
        let app = test_app(store, Arc::new(FakeGateway::default()));
        let user = test_user(1);

        for rating in [6, 9] {
            let (status, _) = send(
                &app,
                authed("POST", "/ratings", &user, Some(json!({ "item_id": item.id, "rating": rating }))),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(
            &app,
            authed("POST", "/ratings", &user, Some(json!({ "item_id": item.id, "rating": 11 }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Rating must be between 1 and 10");

        let (_, body) = send(&app, get(&format!("/items/{}", item.id))).await;
        assert_eq!(body["data"]["avg_rating"], 7.5);

        let (_, body) = send(&app, get("/ratings?book_title=dune")).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }
}
