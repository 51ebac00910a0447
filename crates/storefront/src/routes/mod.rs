//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Health check
//!
//! # Catalog
//! GET  /products                   - Product listing (cached)
//! GET  /products/{id}              - Product detail
//!
//! # Cart (session-backed)
//! GET  /cart                       - Cart contents and totals
//! GET  /cart/count                 - Total units
//! POST /cart/add                   - Add a product
//! POST /cart/subtract              - Take one unit away
//! POST /cart/remove                - Remove a line
//! POST /cart/update                - Set a line's quantity
//! POST /cart/clear                 - Empty the cart
//!
//! # Checkout
//! POST /checkout                   - Place an order, then empty the cart
//!
//! # Bookings
//! POST /bookings                   - Book a vaccination
//! GET  /bookings?email=            - Upcoming and past bookings
//! POST /bookings/{id}/cancel       - Cancel a booking
//! POST /bookings/{id}/reschedule   - Move a booking
//! ```

pub mod bookings;
pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    http::Request,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/subtract", post(cart::subtract))
        .route("/remove", post(cart::remove))
        .route("/update", post(cart::update))
        .route("/clear", post(cart::clear))
}

/// Create the booking routes router.
pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(bookings::index).post(bookings::create))
        .route("/{id}/cancel", post(bookings::cancel))
        .route("/{id}/reschedule", post(bookings::reschedule))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::place))
        .nest("/bookings", booking_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The full application with its middleware stack, minus the Sentry layers
/// which the binary adds outermost.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
