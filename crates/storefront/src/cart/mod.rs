//! Client-local shopping cart.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the ordered line items and every mutation on them
//! - [`KeyValueStore`] is the persistence bridge; the store writes its full
//!   snapshot through it after each change under [`CART_STORAGE_KEY`]
//! - [`MemoryStore`] backs a cart for a single HTTP request or a test,
//!   [`FileStore`] backs the CLI's cart on disk
//!
//! # Example
//!
//! ```rust
//! use pawcare_core::{ItemId, Price};
//! use pawcare_storefront::cart::{CartProduct, CartStore, MemoryStore};
//!
//! let mut cart = CartStore::open(MemoryStore::new());
//! let product = CartProduct::new("p1", "Rabies vaccine", Price::from_cents(1000).unwrap());
//!
//! cart.add_item(&product, 2).unwrap();
//! assert_eq!(cart.total(), Price::from_cents(2000).unwrap().amount());
//! ```

mod item;
mod persistence;
mod store;

pub use item::{CartItem, CartProduct, CartSnapshot, checked_total};
pub use persistence::{CART_STORAGE_KEY, FileStore, KeyValueStore, MemoryStore, PersistenceError};
pub use store::CartStore;

use pawcare_core::PriceError;
use thiserror::Error;

/// Errors returned by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product carries neither an `id` nor an `_id`.
    #[error("cannot add \"{name}\" to the cart: product has no identifier")]
    MissingIdentifier {
        /// Display name of the rejected product.
        name: String,
    },

    /// The change would push the cart total past what a decimal can hold.
    /// The cart is left untouched.
    #[error("cart total is too large")]
    Total(#[source] PriceError),

    /// Writing the snapshot failed. The in-memory cart is already updated.
    #[error("failed to persist cart: {0}")]
    Persistence(#[from] PersistenceError),

    /// Encoding the snapshot failed.
    #[error("failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),
}
