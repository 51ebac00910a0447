//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use crate::api::Order;
use crate::cart::CartStore;
use crate::checkout::{ShippingForm, place_order};
use crate::error::{Result, add_breadcrumb};
use crate::models::session::{load_cart_slot, save_cart_slot};
use crate::state::AppState;

/// Place an order for the session's cart.
///
/// The cart is only emptied once the API has accepted the order.
#[instrument(skip_all)]
pub async fn place(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<ShippingForm>,
) -> Result<(StatusCode, Json<Order>)> {
    let slot = load_cart_slot(&session).await?;
    let mut cart = CartStore::open(slot.clone());

    let order = place_order(&mut cart, state.client(), &form, &state.request_token()).await?;
    save_cart_slot(&session, &slot).await?;

    add_breadcrumb("checkout", "Order placed", &[("order_id", order.id.as_str())]);
    Ok((StatusCode::CREATED, Json(order)))
}
