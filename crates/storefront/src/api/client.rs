//! `reqwest` implementation of the PawCare API client.

use std::sync::Arc;

use moka::future::Cache;
use pawcare_core::{BookingId, Email, ItemId};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::cache::{CacheValue, PRODUCTS_KEY, product_key};
use super::types::{Booking, BookingDraft, ErrorBody, Order, OrderRequest, Product, RescheduleRequest};
use super::{ApiError, GENERIC_ERROR_MESSAGE};
use crate::config::ApiConfig;

/// Client for the PawCare REST API.
///
/// Cheap to clone; clones share the connection pool and the catalog cache.
#[derive(Clone)]
pub struct PetCareClient {
    inner: Arc<PetCareClientInner>,
}

struct PetCareClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    cache: Cache<String, CacheValue>,
}

impl std::fmt::Debug for PetCareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PetCareClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl PetCareClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// cannot take path segments.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("pawcare/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(config.product_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(PetCareClientInner {
                client,
                base_url: config.base_url.clone(),
                token: config.token.clone(),
                cache,
            }),
        })
    }

    /// Build `<base>/api/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match &self.inner.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and decode a JSON success body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());

            tracing::warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "PawCare API returned non-success status"
            );

            if status == StatusCode::NOT_FOUND {
                return Err(ApiError::NotFound(message));
            }
            return Err(ApiError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse PawCare API response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(PRODUCTS_KEY).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let url = self.endpoint(&["products"])?;
        let products: Arc<Vec<Product>> =
            Arc::new(self.execute(self.request(Method::GET, url)).await?);

        self.inner
            .cache
            .insert(PRODUCTS_KEY.to_string(), CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_product(&self, id: &ItemId) -> Result<Product, ApiError> {
        let cache_key = product_key(id.as_str());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&["products", id.as_str()])?;
        let product: Product = self.execute(self.request(Method::GET, url)).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Drop every cached catalog response.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Bookings
    // =========================================================================

    /// Create a vaccination booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the booking or the request fails.
    #[instrument(skip(self, draft), fields(product_id = %draft.product_id, date = %draft.appointment_date))]
    pub async fn create_booking(&self, draft: &BookingDraft) -> Result<Booking, ApiError> {
        let url = self.endpoint(&["bookings"])?;
        self.execute(self.request(Method::POST, url).json(draft)).await
    }

    /// List the bookings made with an email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, email))]
    pub async fn list_bookings(&self, email: &Email) -> Result<Vec<Booking>, ApiError> {
        let mut url = self.endpoint(&["bookings"])?;
        url.query_pairs_mut().append_pair("email", email.as_str());
        self.execute(self.request(Method::GET, url)).await
    }

    /// Fetch one booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is not found or the API request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_booking(&self, id: &BookingId) -> Result<Booking, ApiError> {
        let url = self.endpoint(&["bookings", id.as_str()])?;
        self.execute(self.request(Method::GET, url)).await
    }

    /// Cancel a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the cancellation or the request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn cancel_booking(&self, id: &BookingId) -> Result<Booking, ApiError> {
        let url = self.endpoint(&["bookings", id.as_str(), "cancel"])?;
        self.execute(self.request(Method::PATCH, url)).await
    }

    /// Move a booking to a new date and slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the new slot or the request fails.
    #[instrument(skip(self, request), fields(id = %id, date = %request.appointment_date))]
    pub async fn reschedule_booking(
        &self,
        id: &BookingId,
        request: &RescheduleRequest,
    ) -> Result<Booking, ApiError> {
        let url = self.endpoint(&["bookings", id.as_str(), "reschedule"])?;
        self.execute(self.request(Method::PATCH, url).json(request)).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the order or the request fails.
    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.total))]
    pub async fn place_order(&self, order: &OrderRequest) -> Result<Order, ApiError> {
        let url = self.endpoint(&["orders"])?;
        self.execute(self.request(Method::POST, url).json(order)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> PetCareClient {
        PetCareClient::new(&ApiConfig {
            base_url: Url::parse(base).unwrap(),
            token: None,
            timeout: Duration::from_secs(5),
            product_cache_ttl: Duration::from_secs(60),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_and_encodes_segments() {
        let c = client("http://localhost:5000/");
        let url = c.endpoint(&["bookings", "a b/c", "cancel"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/bookings/a%20b%2Fc/cancel"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let c = client("https://pets.example/v2");
        let url = c.endpoint(&["orders"]).unwrap();
        assert_eq!(url.as_str(), "https://pets.example/v2/api/orders");
    }

    #[test]
    fn test_rejects_non_base_url() {
        let result = PetCareClient::new(&ApiConfig {
            base_url: Url::parse("mailto:vet@example.com").unwrap(),
            token: None,
            timeout: Duration::from_secs(5),
            product_cache_ttl: Duration::from_secs(60),
        });
        assert!(matches!(result, Err(ApiError::InvalidBaseUrl(_))));
    }
}
