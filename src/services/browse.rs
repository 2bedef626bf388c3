//! Catalog reads: item pages, single items, browse-and-sort and author lookups.
//!
//! Field orderings are pushed down to the store. Rating order needs the mean
//! rating per item and is applied here after loading the ratings.

use std::{cmp::Ordering, collections::HashMap, str::FromStr};

use thiserror::Error;

use crate::{
    app::error::AppError,
    models::ItemEntity,
    reference::Genre,
    store::{ItemFilter, ItemOrder, Store},
};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unknown genre: {0}")]
    UnknownGenre(String),

    #[error("Unknown sort key: {0}")]
    UnknownSortKey(String),

    #[error("Invalid page.")]
    InvalidPage,

    #[error("This item does not exist")]
    ItemNotFound,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ItemNotFound | CatalogError::InvalidPage => {
                AppError::NotFound(err.to_string())
            }
            CatalogError::Store(err) => AppError::Other(err),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    AuthorName,
    Price,
    ReleaseDate,
    Rating,
}

impl FromStr for SortKey {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "author_name" => Ok(SortKey::AuthorName),
            "price" => Ok(SortKey::Price),
            "release_date" => Ok(SortKey::ReleaseDate),
            "rating" => Ok(SortKey::Rating),
            other => Err(CatalogError::UnknownSortKey(other.to_string())),
        }
    }
}

/// A validated `browseBy` / `sortBy` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BrowseQuery {
    pub genre: Option<Genre>,
    pub sort: Option<SortKey>,
}

/// Query values that mean "not set": absent, blank or the literal `null`.
fn provided(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != "null")
}

impl BrowseQuery {
    pub fn parse(browse_by: Option<&str>, sort_by: Option<&str>) -> Result<Self, CatalogError> {
        let genre = provided(browse_by)
            .map(|code| {
                Genre::from_code(code).ok_or_else(|| CatalogError::UnknownGenre(code.to_string()))
            })
            .transpose()?;
        let sort = provided(sort_by).map(str::parse).transpose()?;

        Ok(BrowseQuery { genre, sort })
    }
}

/// An item with its mean rating, `None` when nobody rated it yet.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedItem {
    pub item: ItemEntity,
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemPage {
    pub count: i64,
    pub page: i64,
    pub page_size: i64,
    pub results: Vec<RatedItem>,
}

pub fn average_ratings(values: &[(i32, i32)]) -> HashMap<i32, f64> {
    let mut sums: HashMap<i32, (i64, i64)> = HashMap::new();
    for &(item_id, rating) in values {
        let entry = sums.entry(item_id).or_default();
        entry.0 += i64::from(rating);
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(item_id, (sum, count))| (item_id, sum as f64 / count as f64))
        .collect()
}

/// Descending mean rating, unrated items last, ties by ascending id.
pub fn sort_by_rating(items: &mut [RatedItem]) {
    items.sort_by(|a, b| {
        let by_rating = match (a.avg_rating, b.avg_rating) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_rating.then(a.item.id.cmp(&b.item.id))
    });
}

pub async fn with_ratings(
    store: &dyn Store,
    items: Vec<ItemEntity>,
) -> anyhow::Result<Vec<RatedItem>> {
    let ids: Vec<i32> = items.iter().map(|item| item.id).collect();
    let averages = if ids.is_empty() {
        HashMap::new()
    } else {
        average_ratings(&store.rating_values(&ids).await?)
    };

    Ok(items
        .into_iter()
        .map(|item| RatedItem {
            avg_rating: averages.get(&item.id).copied(),
            item,
        })
        .collect())
}

pub async fn list_items(
    store: &dyn Store,
    page: Option<i64>,
    page_size: i64,
) -> Result<ItemPage, CatalogError> {
    let page = page.unwrap_or(1);
    if page < 1 {
        return Err(CatalogError::InvalidPage);
    }

    let count = store.count_items().await?;
    let offset = (page - 1)
        .checked_mul(page_size)
        .ok_or(CatalogError::InvalidPage)?;
    if page > 1 && offset >= count {
        return Err(CatalogError::InvalidPage);
    }

    let items = store.list_items(offset, page_size).await?;
    Ok(ItemPage {
        count,
        page,
        page_size,
        results: with_ratings(store, items).await?,
    })
}

pub async fn get_item(store: &dyn Store, id: i32) -> Result<RatedItem, CatalogError> {
    let item = store.get_item(id).await?.ok_or(CatalogError::ItemNotFound)?;
    Ok(with_ratings(store, vec![item])
        .await?
        .pop()
        .ok_or(CatalogError::ItemNotFound)?)
}

pub async fn browse(store: &dyn Store, query: BrowseQuery) -> Result<Vec<RatedItem>, CatalogError> {
    let filter = ItemFilter {
        genre: query.genre,
        author_name: None,
    };
    let order = match query.sort {
        None | Some(SortKey::Rating) => ItemOrder::Id,
        Some(SortKey::AuthorName) => ItemOrder::AuthorName,
        Some(SortKey::Price) => ItemOrder::Price,
        Some(SortKey::ReleaseDate) => ItemOrder::ReleaseDate,
    };

    let items = store.filter_items(&filter, order).await?;
    let mut items = with_ratings(store, items).await?;
    if query.sort == Some(SortKey::Rating) {
        sort_by_rating(&mut items);
    }
    Ok(items)
}

/// Items written by `author_name`, or the whole catalog when no name is given.
pub async fn items_by_author(
    store: &dyn Store,
    author_name: Option<&str>,
) -> Result<Vec<RatedItem>, CatalogError> {
    let filter = ItemFilter {
        genre: None,
        author_name: author_name.map(str::to_string),
    };
    let items = store.filter_items(&filter, ItemOrder::Id).await?;
    Ok(with_ratings(store, items).await?)
}
