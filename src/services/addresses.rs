//! Per-user billing and shipping addresses.
//!
//! At most one address per user and type is flagged as default. Saving an
//! address as default clears the flag on the others of the same type.

use thiserror::Error;

use crate::{
    app::error::AppError,
    models::{AddressEntity, CreateAddressEntity, UpdateAddressEntity},
    reference::{AddressType, country_name},
    store::Store,
};

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Unknown country code: {0}")]
    UnknownCountry(String),

    #[error("This address does not exist")]
    NotFound,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<AddressError> for AppError {
    fn from(err: AddressError) -> Self {
        match err {
            AddressError::NotFound => AppError::NotFound(err.to_string()),
            AddressError::Store(err) => AppError::Other(err),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddressInput {
    pub street_address: String,
    pub apartment_address: String,
    pub country: String,
    pub zip: String,
    pub address_type: AddressType,
    pub default: bool,
}

impl AddressInput {
    /// Trims every field and checks the required ones.
    fn validated(self) -> Result<AddressInput, AddressError> {
        let street_address = self.street_address.trim().to_string();
        let zip = self.zip.trim().to_string();
        let country = self.country.trim().to_uppercase();

        if street_address.is_empty() {
            return Err(AddressError::MissingField("street_address"));
        }
        if zip.is_empty() {
            return Err(AddressError::MissingField("zip"));
        }
        if country_name(&country).is_none() {
            return Err(AddressError::UnknownCountry(country));
        }

        Ok(AddressInput {
            street_address,
            apartment_address: self.apartment_address.trim().to_string(),
            country,
            zip,
            address_type: self.address_type,
            default: self.default,
        })
    }
}

pub async fn list_addresses(
    store: &dyn Store,
    user_id: i32,
    address_type: Option<AddressType>,
) -> Result<Vec<AddressEntity>, AddressError> {
    Ok(store.list_addresses(user_id, address_type).await?)
}

pub async fn create_address(
    store: &dyn Store,
    user_id: i32,
    input: AddressInput,
) -> Result<AddressEntity, AddressError> {
    let input = input.validated()?;
    if input.default {
        store
            .clear_default_addresses(user_id, input.address_type)
            .await?;
    }

    let address = store
        .create_address(CreateAddressEntity {
            user_id,
            street_address: input.street_address,
            apartment_address: input.apartment_address,
            country: input.country,
            zip: input.zip,
            address_type: input.address_type.code().to_string(),
            is_default: input.default,
        })
        .await?;
    Ok(address)
}

pub async fn update_address(
    store: &dyn Store,
    user_id: i32,
    id: i32,
    input: AddressInput,
) -> Result<AddressEntity, AddressError> {
    let input = input.validated()?;
    store
        .get_address(user_id, id)
        .await?
        .ok_or(AddressError::NotFound)?;

    if input.default {
        store
            .clear_default_addresses(user_id, input.address_type)
            .await?;
    }

    store
        .update_address(
            user_id,
            id,
            UpdateAddressEntity {
                street_address: input.street_address,
                apartment_address: input.apartment_address,
                country: input.country,
                zip: input.zip,
                address_type: input.address_type.code().to_string(),
                is_default: input.default,
            },
        )
        .await?
        .ok_or(AddressError::NotFound)
}

pub async fn delete_address(store: &dyn Store, user_id: i32, id: i32) -> Result<(), AddressError> {
    if !store.delete_address(user_id, id).await? {
        return Err(AddressError::NotFound);
    }
    Ok(())
}
