//! Client for the PawCare REST API.
//!
//! # Architecture
//!
//! - Plain JSON over `reqwest`; the API is source of truth for products,
//!   bookings, and orders - nothing is synced locally
//! - In-memory caching via `moka` for catalog responses (configurable TTL)
//! - No retries and no idempotency keys; every call is fire-and-await
//! - Any call can be raced against a [`CancellationToken`] with
//!   [`with_cancellation`], which drops the in-flight request
//!
//! # Example
//!
//! ```rust,ignore
//! use pawcare_storefront::api::{PetCareClient, with_cancellation};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = PetCareClient::new(&config.api)?;
//! let cancel = CancellationToken::new();
//!
//! let products = client.list_products().await?;
//! let bookings = with_cancellation(&cancel, client.list_bookings(&email)).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::PetCareClient;
pub use types::*;

use std::future::Future;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Fallback shown when a failed response carries no message of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors that can occur when calling the PawCare API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived (connect, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, or the generic fallback.
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL cannot have path segments appended.
    #[error("API base URL cannot be used as a base: {0}")]
    InvalidBaseUrl(String),

    /// The caller cancelled the request.
    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Whether the failure happened because the request timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Message suitable for showing to the person who triggered the call.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote { message, .. } | Self::NotFound(message) => message.clone(),
            Self::RateLimited(_) => "Too many requests. Please wait a moment and try again.".to_string(),
            Self::Cancelled => "Request cancelled".to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Race `fut` against `cancel`.
///
/// If the token fires first the request future is dropped, which aborts the
/// underlying HTTP call, and [`ApiError::Cancelled`] is returned.
///
/// # Errors
///
/// Returns [`ApiError::Cancelled`] on cancellation, otherwise whatever `fut` returns.
pub async fn with_cancellation<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ApiError::Cancelled),
        result = fut => result,
    }
}
