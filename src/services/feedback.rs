//! Reader comments and ratings on catalog items.

use thiserror::Error;

use crate::{
    app::{error::AppError, middleware::CurrentUser},
    models::{CommentEntity, CreateCommentEntity, CreateRatingEntity, ItemEntity, RatingEntity},
    store::Store,
};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 10;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("This item does not exist")]
    ItemNotFound,

    #[error("Comment must not be empty")]
    EmptyComment,

    #[error("Rating must be between 1 and 10")]
    RatingOutOfRange,

    #[error("This comment does not exist")]
    CommentNotFound,

    #[error("This rating does not exist")]
    RatingNotFound,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<FeedbackError> for AppError {
    fn from(err: FeedbackError) -> Self {
        match err {
            FeedbackError::ItemNotFound
            | FeedbackError::CommentNotFound
            | FeedbackError::RatingNotFound => AppError::NotFound(err.to_string()),
            FeedbackError::EmptyComment | FeedbackError::RatingOutOfRange => {
                AppError::BadRequest(err.to_string())
            }
            FeedbackError::Store(err) => AppError::Other(err),
        }
    }
}

async fn find_item(store: &dyn Store, item_id: i32) -> Result<ItemEntity, FeedbackError> {
    store
        .get_item(item_id)
        .await?
        .ok_or(FeedbackError::ItemNotFound)
}

pub async fn list_comments(
    store: &dyn Store,
    book_title: Option<&str>,
) -> Result<Vec<CommentEntity>, FeedbackError> {
    Ok(store.list_comments(book_title).await?)
}

pub async fn add_comment(
    store: &dyn Store,
    user: &CurrentUser,
    item_id: i32,
    content: &str,
) -> Result<CommentEntity, FeedbackError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(FeedbackError::EmptyComment);
    }

    let item = find_item(store, item_id).await?;
    let comment = store
        .create_comment(CreateCommentEntity {
            user_id: user.id,
            username: user.username.clone(),
            item_id: item.id,
            book_title: item.title,
            content: content.to_string(),
        })
        .await?;
    Ok(comment)
}

pub async fn delete_comment(store: &dyn Store, user_id: i32, id: i32) -> Result<(), FeedbackError> {
    if !store.delete_comment(user_id, id).await? {
        return Err(FeedbackError::CommentNotFound);
    }
    Ok(())
}

pub async fn list_ratings(
    store: &dyn Store,
    book_title: Option<&str>,
) -> Result<Vec<RatingEntity>, FeedbackError> {
    Ok(store.list_ratings(book_title).await?)
}

pub async fn add_rating(
    store: &dyn Store,
    user: &CurrentUser,
    item_id: i32,
    rating: i32,
) -> Result<RatingEntity, FeedbackError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(FeedbackError::RatingOutOfRange);
    }

    let item = find_item(store, item_id).await?;
    let rating = store
        .create_rating(CreateRatingEntity {
            user_id: user.id,
            username: user.username.clone(),
            item_id: item.id,
            book_title: item.title,
            rating,
        })
        .await?;
    Ok(rating)
}

pub async fn delete_rating(store: &dyn Store, user_id: i32, id: i32) -> Result<(), FeedbackError> {
    if !store.delete_rating(user_id, id).await? {
        return Err(FeedbackError::RatingNotFound);
    }
    Ok(())
}
