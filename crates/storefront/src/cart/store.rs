//! The cart store.

use pawcare_core::ItemId;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::persistence::{CART_STORAGE_KEY, KeyValueStore};
use super::{CartError, CartItem, CartProduct, CartSnapshot, checked_total};

/// Ordered cart line items with write-through persistence.
///
/// Every mutation builds the complete next list, swaps it in, and writes the
/// whole snapshot to the store. Mutating an id that isn't in the cart is a
/// no-op and writes nothing.
#[derive(Debug)]
pub struct CartStore<S> {
    items: Vec<CartItem>,
    storage: S,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Open the cart persisted in `storage`.
    ///
    /// A missing slot yields an empty cart. An unreadable or malformed slot
    /// is logged and also yields an empty cart, as does one whose total does
    /// not fit in a decimal.
    pub fn open(storage: S) -> Self {
        let items = match storage.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartItem>>(&raw) {
                Ok(items) => {
                    let items = normalize(items);
                    match checked_total(&items) {
                        Ok(_) => items,
                        Err(e) => {
                            warn!(error = %e, "Discarding cart snapshot with unrepresentable total");
                            Vec::new()
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Discarding malformed cart snapshot");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read cart snapshot, starting empty");
                Vec::new()
            }
        };

        debug!(items = items.len(), "Cart opened");
        Self { items, storage }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// An owned copy of the current items.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
        }
    }

    /// Sum of `price × quantity`, recomputed on each call.
    ///
    /// Mutations refuse to push the total out of range and `open` discards
    /// snapshots that are, so the sum always fits.
    #[must_use]
    pub fn total(&self) -> Decimal {
        checked_total(&self.items).unwrap_or(Decimal::MAX)
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.get(id).is_some()
    }

    /// The underlying store.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Add `quantity` of `product`, merging into an existing line with the same id.
    ///
    /// A quantity of zero changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::MissingIdentifier`] if the product has neither an
    /// `id` nor an `_id`, or [`CartError::Total`] if the new total would not
    /// fit; the cart is left untouched either way. Returns a persistence
    /// error if the snapshot could not be written.
    pub fn add_item(&mut self, product: &CartProduct, quantity: u32) -> Result<(), CartError> {
        let Some(id) = product.resolve_id() else {
            warn!(name = %product.name, "Refusing to add product without an identifier");
            return Err(CartError::MissingIdentifier {
                name: product.name.clone(),
            });
        };
        if quantity == 0 {
            return Ok(());
        }

        let mut next = self.items.clone();
        if let Some(existing) = next.iter_mut().find(|item| &item.id == id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            next.push(product.to_line(id.clone(), quantity));
        }
        self.replace(next)
    }

    /// Decrement a line by one, removing it when it reaches zero.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the snapshot could not be written.
    pub fn subtract_item(&mut self, id: &ItemId) -> Result<(), CartError> {
        if !self.contains(id) {
            return Ok(());
        }
        let next = self
            .items
            .iter()
            .filter_map(|item| {
                if &item.id != id {
                    return Some(item.clone());
                }
                let quantity = item.quantity.saturating_sub(1);
                (quantity > 0).then(|| CartItem {
                    quantity,
                    ..item.clone()
                })
            })
            .collect();
        self.replace(next)
    }

    /// Remove a line regardless of its quantity.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the snapshot could not be written.
    pub fn remove_item(&mut self, id: &ItemId) -> Result<(), CartError> {
        if !self.contains(id) {
            return Ok(());
        }
        let next = self
            .items
            .iter()
            .filter(|item| &item.id != id)
            .cloned()
            .collect();
        self.replace(next)
    }

    /// Set a line's quantity to `max(0, quantity)`; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Total`] if the new total would not fit, leaving
    /// the cart untouched. Returns a persistence error if the snapshot could
    /// not be written.
    pub fn update_quantity(&mut self, id: &ItemId, quantity: i64) -> Result<(), CartError> {
        if !self.contains(id) {
            return Ok(());
        }
        let clamped = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);
        let next = self
            .items
            .iter()
            .filter_map(|item| {
                if &item.id != id {
                    return Some(item.clone());
                }
                (clamped > 0).then(|| CartItem {
                    quantity: clamped,
                    ..item.clone()
                })
            })
            .collect();
        self.replace(next)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the snapshot could not be written.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.replace(Vec::new())
    }

    fn replace(&mut self, next: Vec<CartItem>) -> Result<(), CartError> {
        if let Err(e) = checked_total(&next) {
            warn!(error = %e, "Refusing cart change that overflows the total");
            return Err(CartError::Total(e));
        }
        self.items = next;
        self.persist()
    }

    fn persist(&self) -> Result<(), CartError> {
        let raw = serde_json::to_string(&self.items)?;
        self.storage.set(CART_STORAGE_KEY, &raw)?;
        Ok(())
    }
}

/// Restore the cart invariants on a snapshot read from storage: merge lines
/// sharing an id into the first occurrence and drop zero-quantity lines.
fn normalize(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut out: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 {
            continue;
        }
        if let Some(existing) = out.iter_mut().find(|kept| kept.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            out.push(item);
        }
    }
    out
}
