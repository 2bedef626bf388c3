use thiserror::Error;

use crate::{
    app::error::AppError,
    models::{ItemEntity, SavedItemEntity},
    store::Store,
};

#[derive(Debug, Error)]
pub enum SavedError {
    #[error("Invalid request")]
    MissingSlug,

    #[error("This item does not exist")]
    ItemNotFound,

    #[error("This saved item does not exist")]
    NotFound,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<SavedError> for AppError {
    fn from(err: SavedError) -> Self {
        match err {
            SavedError::MissingSlug | SavedError::ItemNotFound => {
                AppError::BadRequest(err.to_string())
            }
            SavedError::NotFound => AppError::NotFound(err.to_string()),
            SavedError::Store(err) => AppError::Other(err),
        }
    }
}

pub async fn list_saved(
    store: &dyn Store,
    user_id: i32,
) -> Result<Vec<(SavedItemEntity, ItemEntity)>, SavedError> {
    Ok(store.list_saved_items(user_id).await?)
}

/// Saves the item for later. Saving it again returns the existing entry.
pub async fn save_for_later(
    store: &dyn Store,
    user_id: i32,
    slug: &str,
) -> Result<(SavedItemEntity, ItemEntity), SavedError> {
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(SavedError::MissingSlug);
    }

    let item = store
        .find_item_by_slug(slug)
        .await?
        .ok_or(SavedError::ItemNotFound)?;
    let saved = store.save_item(user_id, item.id).await?;
    Ok((saved, item))
}

pub async fn remove_saved(store: &dyn Store, user_id: i32, id: i32) -> Result<(), SavedError> {
    if !store.delete_saved_item(user_id, id).await? {
        return Err(SavedError::NotFound);
    }
    Ok(())
}
