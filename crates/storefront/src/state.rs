//! Application state shared across handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, PetCareClient};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    client: PetCareClient,
    shutdown: CancellationToken,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built from `config.api`.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let client = PetCareClient::new(&config.api)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                client,
                shutdown: CancellationToken::new(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the PawCare API client.
    #[must_use]
    pub fn client(&self) -> &PetCareClient {
        &self.inner.client
    }

    /// Token cancelled when the server starts shutting down.
    #[must_use]
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }

    /// Token for one request's outbound API calls; fires on shutdown.
    #[must_use]
    pub fn request_token(&self) -> CancellationToken {
        self.inner.shutdown.child_token()
    }
}
