//! Cart line items and snapshots.

use pawcare_core::{ItemId, Price, PriceError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const fn default_quantity() -> u32 {
    1
}

/// A single product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Unique within a cart.
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Always at least 1 while the item is in a cart.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl CartItem {
    /// `price × quantity` for this line.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the line total does not fit.
    pub fn line_total(&self) -> Result<Decimal, PriceError> {
        self.price.line_total(self.quantity)
    }
}

/// Sum of `price × quantity` across `items`.
///
/// # Errors
///
/// Returns [`PriceError::Overflow`] if any line or the running sum does not fit.
pub fn checked_total(items: &[CartItem]) -> Result<Decimal, PriceError> {
    items.iter().try_fold(Decimal::ZERO, |acc, item| {
        acc.checked_add(item.line_total()?)
            .ok_or(PriceError::Overflow)
    })
}

/// A product as handed to [`CartStore::add_item`](super::CartStore::add_item).
///
/// Catalog records have been keyed by `id` in some responses and `_id` in
/// others; both are accepted and `id` wins when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub fallback_id: Option<ItemId>,
    #[serde(default)]
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartProduct {
    /// Create a product with a primary identifier.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: Some(id.into()),
            fallback_id: None,
            name: name.into(),
            price,
            image: None,
        }
    }

    /// Attach an image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// The identifier to key the cart line by, if any.
    ///
    /// Blank identifiers count as missing.
    #[must_use]
    pub fn resolve_id(&self) -> Option<&ItemId> {
        self.id
            .as_ref()
            .filter(|id| !id.is_blank())
            .or_else(|| self.fallback_id.as_ref().filter(|id| !id.is_blank()))
    }

    pub(crate) fn to_line(&self, id: ItemId, quantity: u32) -> CartItem {
        CartItem {
            id,
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
            quantity,
        }
    }
}

/// An ordered copy of the cart's line items.
///
/// Totals are derived on every call and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
}

impl CartSnapshot {
    /// Sum of `price × quantity` across all items.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the total does not fit.
    pub fn total(&self) -> Result<Decimal, PriceError> {
        checked_total(&self.items)
    }

    /// Sum of quantities, as shown on the header badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_id_prefers_primary() {
        let mut product = CartProduct::new("a", "Collar", Price::ZERO);
        product.fallback_id = Some(ItemId::new("b"));
        assert_eq!(product.resolve_id().unwrap().as_str(), "a");
    }

    #[test]
    fn test_resolve_id_uses_fallback_when_primary_blank() {
        let product: CartProduct =
            serde_json::from_str(r#"{"id": "", "_id": 77, "name": "Leash", "price": 5}"#).unwrap();
        assert_eq!(product.resolve_id().unwrap().as_str(), "77");
    }

    #[test]
    fn test_resolve_id_none() {
        let product: CartProduct =
            serde_json::from_str(r#"{"name": "Mystery", "price": 1}"#).unwrap();
        assert!(product.resolve_id().is_none());
    }

    #[test]
    fn test_item_defaults_quantity_to_one() {
        let item: CartItem =
            serde_json::from_str(r#"{"id": 3, "name": "Treats", "price": "2.50"}"#).unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.id.as_str(), "3");
    }

    #[test]
    fn test_snapshot_totals() {
        let snapshot = CartSnapshot {
            items: vec![
                CartProduct::new("a", "A", Price::from_cents(1000).unwrap()).to_line(ItemId::new("a"), 2),
                CartProduct::new("b", "B", Price::from_cents(250).unwrap()).to_line(ItemId::new("b"), 4),
            ],
        };
        assert_eq!(snapshot.total().unwrap(), Decimal::new(3000, 2));
        assert_eq!(snapshot.item_count(), 6);
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let huge: Price = "50000000000000000000000000000".parse().unwrap();
        let snapshot = CartSnapshot {
            items: vec![
                CartProduct::new("a", "A", huge).to_line(ItemId::new("a"), 1),
                CartProduct::new("b", "B", huge).to_line(ItemId::new("b"), 1),
            ],
        };
        assert_eq!(snapshot.total(), Err(PriceError::Overflow));
    }
}
