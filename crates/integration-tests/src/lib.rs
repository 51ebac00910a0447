//! Integration test support for PawCare.
//!
//! [`MockApi`] serves the PawCare REST API from memory on an ephemeral local
//! port so the client, the booking flows, checkout, and the HTTP routes can be
//! exercised end to end without a real backend.
//!
//! # Test Categories
//!
//! - `api_client` - Client, wizard, booking management, and checkout against the mock
//! - `storefront_routes` - HTTP routes driven with `tower::ServiceExt::oneshot`
//! - `file_persistence` - File-backed carts across reopen

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use pawcare_storefront::config::{ApiConfig, StorefrontConfig};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

/// A canned failure: status code and JSON body.
pub type Failure = (u16, Value);

#[derive(Debug, Default)]
struct MockState {
    products: Vec<Value>,
    bookings: Vec<Value>,
    orders: Vec<Value>,
    product_requests: usize,
    next_id: u64,
    booking_failure: Option<Failure>,
    order_failure: Option<Failure>,
    delay: Option<Duration>,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

type Shared = Arc<Mutex<MockState>>;

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory PawCare API.
#[derive(Debug, Clone)]
pub struct MockApi {
    addr: SocketAddr,
    state: Shared,
}

impl MockApi {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = Shared::default();
        {
            let mut s = lock(&state);
            s.products = vec![
                json!({"_id": "vac-rabies", "name": "Rabies vaccine", "price": 35, "category": "vaccination"}),
                json!({"id": "kibble-5kg", "name": "Kibble 5kg", "price": "24.99", "image": "/img/kibble.png"}),
            ];
        }

        let router = Router::new()
            .route("/api/products", get(list_products))
            .route("/api/products/{id}", get(get_product))
            .route("/api/bookings", get(list_bookings).post(create_booking))
            .route("/api/bookings/{id}", get(get_booking))
            .route("/api/bookings/{id}/cancel", patch(cancel_booking))
            .route("/api/bookings/{id}/reschedule", patch(reschedule_booking))
            .route("/api/orders", axum::routing::post(create_order))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { addr, state })
    }

    /// Base URL the client should be pointed at.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("socket address forms a valid URL")
    }

    /// API settings for this mock with a generous timeout.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        self.api_config_with_timeout(Duration::from_secs(5))
    }

    /// API settings for this mock with a custom request timeout.
    #[must_use]
    pub fn api_config_with_timeout(&self, timeout: Duration) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url(),
            token: None,
            timeout,
            product_cache_ttl: Duration::from_secs(60),
        }
    }

    /// Storefront settings wired to this mock.
    #[must_use]
    pub fn storefront_config(&self) -> StorefrontConfig {
        StorefrontConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            api: self.api_config(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Store a booking as if it had been created earlier. Returns its id.
    pub fn seed_booking(&self, mut booking: Value) -> String {
        let mut s = lock(&self.state);
        let id = s.next_id("bk");
        booking["_id"] = json!(id);
        s.bookings.push(booking);
        id
    }

    /// Make every booking creation fail with `failure`.
    pub fn fail_bookings(&self, failure: Option<Failure>) {
        lock(&self.state).booking_failure = failure;
    }

    /// Make every order fail with `failure`.
    pub fn fail_orders(&self, failure: Option<Failure>) {
        lock(&self.state).order_failure = failure;
    }

    /// Delay every write response.
    pub fn set_delay(&self, delay: Option<Duration>) {
        lock(&self.state).delay = delay;
    }

    /// How many times the product list was fetched.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        lock(&self.state).product_requests
    }

    /// Orders received so far.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        lock(&self.state).orders.clone()
    }

    /// Bookings held by the mock.
    #[must_use]
    pub fn bookings(&self) -> Vec<Value> {
        lock(&self.state).bookings.clone()
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn failure_response((status, body): Failure) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

fn not_found(what: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "message": format!("{what} not found") }))).into_response()
}

async fn pause(state: &Shared) {
    let delay = lock(state).delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

async fn list_products(State(state): State<Shared>) -> Json<Value> {
    let mut s = lock(&state);
    s.product_requests += 1;
    Json(Value::Array(s.products.clone()))
}

fn id_of(record: &Value) -> Option<&str> {
    record
        .get("_id")
        .or_else(|| record.get("id"))
        .and_then(Value::as_str)
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let s = lock(&state);
    s.products
        .iter()
        .find(|p| id_of(p) == Some(id.as_str()))
        .map_or_else(|| not_found("Product"), |p| Json(p.clone()).into_response())
}

#[derive(Deserialize)]
struct EmailQuery {
    email: Option<String>,
}

async fn list_bookings(State(state): State<Shared>, Query(q): Query<EmailQuery>) -> Json<Value> {
    let s = lock(&state);
    let wanted = q.email.unwrap_or_default().to_lowercase();
    let found = s
        .bookings
        .iter()
        .filter(|b| {
            b.get("email")
                .and_then(Value::as_str)
                .is_some_and(|e| e.to_lowercase() == wanted)
        })
        .cloned()
        .collect();
    Json(Value::Array(found))
}

async fn create_booking(State(state): State<Shared>, Json(mut body): Json<Value>) -> Response {
    pause(&state).await;
    let mut s = lock(&state);
    if let Some(failure) = s.booking_failure.clone() {
        return failure_response(failure);
    }
    body["_id"] = json!(s.next_id("bk"));
    body["status"] = json!("pending");
    body["createdAt"] = json!("2026-10-19T12:00:00Z");
    s.bookings.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

fn update_booking(state: &Shared, id: &str, apply: impl FnOnce(&mut Value)) -> Response {
    let mut s = lock(state);
    match s.bookings.iter_mut().find(|b| id_of(b) == Some(id)) {
        Some(booking) => {
            apply(booking);
            Json(booking.clone()).into_response()
        }
        None => not_found("Booking"),
    }
}

async fn get_booking(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    update_booking(&state, &id, |_| {})
}

async fn cancel_booking(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    pause(&state).await;
    update_booking(&state, &id, |b| b["status"] = json!("cancelled"))
}

async fn reschedule_booking(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    pause(&state).await;
    update_booking(&state, &id, |b| {
        b["appointmentDate"] = body["appointmentDate"].clone();
        b["timeSlot"] = body["timeSlot"].clone();
    })
}

async fn create_order(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    pause(&state).await;
    let mut s = lock(&state);
    if let Some(failure) = s.order_failure.clone() {
        return failure_response(failure);
    }
    let order = json!({
        "_id": s.next_id("ord"),
        "items": body["items"],
        "total": body["total"],
        "status": "pending",
        "createdAt": "2026-10-19T12:00:00Z",
    });
    s.orders.push(body);
    (StatusCode::CREATED, Json(order)).into_response()
}

/// A complete booking body as the API would store it.
#[must_use]
pub fn booking_record(email: &str, date: &str, status: &str) -> Value {
    json!({
        "productId": "vac-rabies",
        "productName": "Rabies vaccine",
        "appointmentDate": date,
        "timeSlot": "9:00 AM",
        "ownerName": "Sam Rivera",
        "email": email,
        "phone": "5551234567",
        "address": "1 Main St",
        "petName": "Rex",
        "petType": "dog",
        "breed": "Beagle",
        "petAge": "3",
        "status": status,
    })
}
