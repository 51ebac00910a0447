//! Cart route handlers.
//!
//! Each request copies the session's cart slot into a [`MemoryStore`], runs
//! one [`CartStore`] operation on it, and writes the slot back. Responses are
//! the cart as it stands afterwards.

use axum::Json;
use pawcare_core::{ItemId, Price, format_amount};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{CartError, CartItem, CartProduct, CartStore, MemoryStore};
use crate::error::{Result, add_breadcrumb};
use crate::models::session::{load_cart_slot, save_cart_slot};

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total: Price,
    /// `total` formatted as `$x.xx`.
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Price::ZERO,
            subtotal: format_amount(Price::ZERO.amount()),
            item_count: 0,
        }
    }
}

impl From<&CartStore<MemoryStore>> for CartView {
    fn from(cart: &CartStore<MemoryStore>) -> Self {
        let total = cart.total();
        Self {
            items: cart.items().to_vec(),
            // Line totals of non-negative prices are never negative
            total: Price::new(total).unwrap_or(Price::ZERO),
            subtotal: format_amount(total),
            item_count: cart.item_count(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Open the session's cart read-only.
async fn read_cart(session: &Session) -> Result<CartStore<MemoryStore>> {
    Ok(CartStore::open(load_cart_slot(session).await?))
}

/// Run one cart operation against the session's cart and save the result.
async fn mutate_cart<F>(session: &Session, op: F) -> Result<CartView>
where
    F: FnOnce(&mut CartStore<MemoryStore>) -> std::result::Result<(), CartError>,
{
    let slot = load_cart_slot(session).await?;
    let mut cart = CartStore::open(slot.clone());
    op(&mut cart)?;
    save_cart_slot(session, &slot).await?;
    Ok(CartView::from(&cart))
}

const fn default_quantity() -> u32 {
    1
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product: CartProduct,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// Body naming a single cart line.
#[derive(Debug, Deserialize)]
pub struct LineRequest {
    pub id: ItemId,
}

/// Update cart request body. Zero or negative removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub id: ItemId,
    pub quantity: i64,
}

/// Cart count badge.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Display the cart.
#[instrument(skip_all)]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = read_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Total number of units in the cart.
#[instrument(skip_all)]
pub async fn count(session: Session) -> Result<Json<CartCount>> {
    let cart = read_cart(&session).await?;
    Ok(Json(CartCount {
        count: cart.item_count(),
    }))
}

/// Add a product to the cart.
#[instrument(skip_all)]
pub async fn add(
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let view = mutate_cart(&session, |cart| {
        cart.add_item(&request.product, request.quantity)
    })
    .await?;

    if let Some(id) = request.product.resolve_id() {
        add_breadcrumb("cart", "Added item", &[("item_id", id.as_str())]);
    }
    Ok(Json(view))
}

/// Take one unit of a line away.
#[instrument(skip_all)]
pub async fn subtract(
    session: Session,
    Json(request): Json<LineRequest>,
) -> Result<Json<CartView>> {
    let view = mutate_cart(&session, |cart| cart.subtract_item(&request.id)).await?;
    Ok(Json(view))
}

/// Remove a line.
#[instrument(skip_all)]
pub async fn remove(
    session: Session,
    Json(request): Json<LineRequest>,
) -> Result<Json<CartView>> {
    let view = mutate_cart(&session, |cart| cart.remove_item(&request.id)).await?;
    add_breadcrumb("cart", "Removed item", &[("item_id", request.id.as_str())]);
    Ok(Json(view))
}

/// Set a line's quantity.
#[instrument(skip_all)]
pub async fn update(
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    let view = mutate_cart(&session, |cart| {
        cart.update_quantity(&request.id, request.quantity)
    })
    .await?;
    Ok(Json(view))
}

/// Empty the cart.
#[instrument(skip_all)]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    mutate_cart(&session, CartStore::<MemoryStore>::clear).await?;
    Ok(Json(CartView::empty()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_view_from_store() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.add_item(
            &CartProduct::new("p1", "Kibble", Price::from_cents(1250).unwrap()),
            3,
        )
        .unwrap();

        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, "$37.50");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["itemCount"], 3);
        assert_eq!(json["total"], 37.5);
    }

    #[test]
    fn test_empty_view() {
        let view = CartView::empty();
        assert!(view.items.is_empty());
        assert_eq!(view.subtotal, "$0.00");
    }

    #[test]
    fn test_add_request_defaults_quantity() {
        let request: AddToCartRequest =
            serde_json::from_str(r#"{"product":{"_id":"p1","name":"Kibble","price":"4.50"}}"#)
                .unwrap();
        assert_eq!(request.quantity, 1);
        assert_eq!(request.product.resolve_id().unwrap().as_str(), "p1");
    }
}
