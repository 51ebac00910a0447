//! HTTP route tests for the storefront, driven in-process with `oneshot`.
//!
//! The session cookie from the first response is replayed on later requests,
//! the way a browser would.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use pawcare_integration_tests::{MockApi, booking_record};
use pawcare_storefront::middleware::{REQUEST_ID_HEADER, SESSION_COOKIE_NAME};
use pawcare_storefront::routes;
use pawcare_storefront::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

struct Harness {
    mock: MockApi,
    app: Router,
    cookie: Option<String>,
}

impl Harness {
    async fn new() -> Self {
        let mock = MockApi::start().await.unwrap();
        let state = AppState::new(mock.storefront_config()).unwrap();
        Self {
            app: routes::app(state),
            mock,
            cookie: None,
        }
    }

    async fn send(&mut self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    async fn get(&mut self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    async fn post(&mut self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }
}

fn kibble() -> Value {
    json!({ "id": "kibble-5kg", "name": "Kibble 5kg", "price": 24.99 })
}

// =============================================================================
// Health & middleware
// =============================================================================

#[tokio::test]
async fn test_health_and_request_id() {
    let harness = Harness::new().await;
    let request = Request::builder()
        .uri("/health")
        .header(REQUEST_ID_HEADER, "edge-42")
        .body(Body::empty())
        .unwrap();

    let response = harness.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "edge-42");
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_new_visitor_has_empty_cart() {
    let mut h = Harness::new().await;
    let (status, cart) = h.get("/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"], json!([]));
    assert_eq!(cart["total"], 0);
    assert_eq!(cart["subtotal"], "$0.00");
    assert_eq!(cart["itemCount"], 0);
}

#[tokio::test]
async fn test_add_accumulates_across_requests() {
    let mut h = Harness::new().await;

    let (status, _) = h.post("/cart/add", json!({ "product": kibble() })).await;
    assert_eq!(status, StatusCode::OK);
    let cookie = h.cookie.clone().unwrap();
    assert!(cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=")));

    let (_, cart) = h
        .post("/cart/add", json!({ "product": kibble(), "quantity": 2 }))
        .await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 3);
    assert_eq!(cart["subtotal"], "$74.97");

    let (_, count) = h.get("/cart/count").await;
    assert_eq!(count["count"], 3);
}

#[tokio::test]
async fn test_add_with_fallback_id() {
    let mut h = Harness::new().await;
    let (status, cart) = h
        .post(
            "/cart/add",
            json!({ "product": { "_id": "vac-rabies", "name": "Rabies vaccine", "price": "35" } }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"][0]["id"], "vac-rabies");
    assert_eq!(cart["total"], 35);
}

#[tokio::test]
async fn test_add_without_id_is_rejected() {
    let mut h = Harness::new().await;
    let (status, body) = h
        .post("/cart/add", json!({ "product": { "name": "Mystery", "price": 1 } }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Mystery"));

    let (_, cart) = h.get("/cart").await;
    assert_eq!(cart["itemCount"], 0);
}

#[tokio::test]
async fn test_add_past_representable_total_is_rejected() {
    let mut h = Harness::new().await;
    let gold = json!({ "id": "gold", "name": "Gold collar", "price": "40000000000000000000000000000" });

    let (status, _) = h.post("/cart/add", json!({ "product": gold })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = h
        .post("/cart/add", json!({ "product": gold, "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "cart total is too large");

    let (status, cart) = h.get("/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["itemCount"], 1);
}

#[tokio::test]
async fn test_subtract_update_remove_clear() {
    let mut h = Harness::new().await;
    h.post("/cart/add", json!({ "product": kibble(), "quantity": 2 }))
        .await;
    h.post(
        "/cart/add",
        json!({ "product": { "id": 7, "name": "Collar", "price": 5 } }),
    )
    .await;

    let (_, cart) = h.post("/cart/subtract", json!({ "id": "kibble-5kg" })).await;
    assert_eq!(cart["items"][0]["quantity"], 1);

    let (_, cart) = h.post("/cart/subtract", json!({ "id": "kibble-5kg" })).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["id"], "7");

    let (_, cart) = h.post("/cart/update", json!({ "id": "7", "quantity": 4 })).await;
    assert_eq!(cart["itemCount"], 4);
    assert_eq!(cart["total"], 20);

    let (_, cart) = h.post("/cart/update", json!({ "id": 7, "quantity": -3 })).await;
    assert_eq!(cart["itemCount"], 0);

    h.post("/cart/add", json!({ "product": kibble() })).await;
    let (_, cart) = h.post("/cart/remove", json!({ "id": "kibble-5kg" })).await;
    assert_eq!(cart["items"], json!([]));

    h.post("/cart/add", json!({ "product": kibble() })).await;
    let (status, cart) = h.send("POST", "/cart/clear", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["itemCount"], 0);
    let (_, cart) = h.get("/cart").await;
    assert_eq!(cart["itemCount"], 0);
}

#[tokio::test]
async fn test_sessions_do_not_share_carts() {
    let mut first = Harness::new().await;
    first.post("/cart/add", json!({ "product": kibble() })).await;

    let mut second = Harness {
        mock: first.mock.clone(),
        app: first.app.clone(),
        cookie: None,
    };
    let (_, cart) = second.get("/cart").await;
    assert_eq!(cart["itemCount"], 0);

    let (_, cart) = first.get("/cart").await;
    assert_eq!(cart["itemCount"], 1);
}

// =============================================================================
// Checkout
// =============================================================================

fn shipping() -> Value {
    json!({
        "fullName": "Sam Rivera",
        "email": "sam@example.com",
        "phone": "555-123-4567",
        "address": "1 Main St",
        "city": "Springfield",
        "postalCode": "12345",
    })
}

#[tokio::test]
async fn test_checkout_clears_session_cart() {
    let mut h = Harness::new().await;
    h.post("/cart/add", json!({ "product": kibble(), "quantity": 2 }))
        .await;

    let (status, order) = h.post("/checkout", shipping()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["total"], 49.98);
    assert_eq!(h.mock.orders().len(), 1);

    let (_, cart) = h.get("/cart").await;
    assert_eq!(cart["itemCount"], 0);
}

#[tokio::test]
async fn test_failed_checkout_keeps_session_cart() {
    let mut h = Harness::new().await;
    h.mock
        .fail_orders(Some((422, json!({ "message": "Out of stock" }))));
    h.post("/cart/add", json!({ "product": kibble() })).await;

    let (status, body) = h.post("/checkout", shipping()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Out of stock");

    let (_, cart) = h.get("/cart").await;
    assert_eq!(cart["itemCount"], 1);
}

#[tokio::test]
async fn test_checkout_with_empty_cart() {
    let mut h = Harness::new().await;
    let (status, body) = h.post("/checkout", shipping()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Your cart is empty");
}

// =============================================================================
// Catalog & bookings
// =============================================================================

#[tokio::test]
async fn test_products_proxy() {
    let mut h = Harness::new().await;
    let (status, products) = h.get("/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(products.as_array().unwrap().len(), 2);

    let (status, _) = h.get("/products/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn booking_form(phone: &str) -> Value {
    json!({
        "productId": "vac-rabies",
        "productName": "Rabies vaccine",
        "appointmentDate": "2030-01-15",
        "timeSlot": "10:00 AM",
        "ownerName": "Sam Rivera",
        "email": "sam@example.com",
        "phone": phone,
        "address": "1 Main St",
        "petName": "Rex",
        "petType": "dog",
        "breed": "Beagle",
        "petAge": "3",
    })
}

#[tokio::test]
async fn test_booking_form_is_validated() {
    let mut h = Harness::new().await;
    let (status, body) = h.post("/bookings", booking_form("555123456")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please enter a valid 10-digit phone number");
    assert!(h.mock.bookings().is_empty());
}

#[tokio::test]
async fn test_booking_create_list_cancel() {
    let mut h = Harness::new().await;
    h.mock
        .seed_booking(booking_record("sam@example.com", "2020-05-01", "completed"));

    let (status, booking) = h.post("/bookings", booking_form("5551234567")).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = booking["id"].as_str().unwrap().to_string();

    // The email used to book is remembered by the session
    let (status, list) = h.get("/bookings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["upcoming"].as_array().unwrap().len(), 1);
    assert_eq!(list["past"].as_array().unwrap().len(), 1);

    let (status, cancelled) = h
        .send("POST", &format!("/bookings/{id}/cancel"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    let (status, body) = h
        .send("POST", &format!("/bookings/{id}/cancel"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Cannot cancel a cancelled booking");
}

#[tokio::test]
async fn test_reschedule_into_past_is_rejected() {
    let mut h = Harness::new().await;
    let id = h
        .mock
        .seed_booking(booking_record("sam@example.com", "2030-02-01", "confirmed"));

    let (status, _) = h
        .post(
            &format!("/bookings/{id}/reschedule"),
            json!({ "appointmentDate": "2001-01-01", "timeSlot": "9:00 AM" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, moved) = h
        .post(
            &format!("/bookings/{id}/reschedule"),
            json!({ "appointmentDate": "2030-03-01", "timeSlot": "2:00 PM" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["appointmentDate"], "2030-03-01");
}

#[tokio::test]
async fn test_bookings_lookup_requires_email() {
    let mut h = Harness::new().await;
    let (status, _) = h.get("/bookings").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h.get("/bookings?email=not-an-email").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
