//! Subcommand implementations.

pub mod bookings;
pub mod cart;
pub mod products;

use pawcare_core::{ContactError, PriceError};
use pawcare_storefront::api::{ApiError, PetCareClient};
use pawcare_storefront::booking::ManageError;
use pawcare_storefront::cart::CartError;
use pawcare_storefront::config::{ApiConfig, ConfigError};
use thiserror::Error;

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Invalid price: {0}")]
    Price(#[from] PriceError),

    #[error("Invalid email: {0}")]
    Email(#[from] ContactError),

    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    #[error(transparent)]
    Manage(ManageError),
}

impl From<ManageError> for CliError {
    fn from(err: ManageError) -> Self {
        match err {
            ManageError::Api(api) => Self::Api(api),
            other => Self::Manage(other),
        }
    }
}

/// Build an API client from `PAWCARE_API_*` settings.
fn client() -> Result<PetCareClient, CliError> {
    Ok(PetCareClient::new(&ApiConfig::from_env()?)?)
}
