//! Session-related types.
//!
//! The cart lives in the session as the same JSON string a browser would keep
//! under its `cart` local-storage key, so snapshots move freely between the
//! two.

use tower_sessions::Session;

use crate::cart::{CART_STORAGE_KEY, MemoryStore};

/// Session keys.
pub mod keys {
    /// Serialized cart snapshot.
    pub const CART: &str = super::CART_STORAGE_KEY;

    /// Email last used to look up bookings.
    pub const BOOKING_EMAIL: &str = "booking_email";
}

/// Copy the session's cart slot into a fresh [`MemoryStore`].
///
/// # Errors
///
/// Returns the session store error.
pub async fn load_cart_slot(session: &Session) -> Result<MemoryStore, tower_sessions::session::Error> {
    Ok(match session.get::<String>(keys::CART).await? {
        Some(raw) => MemoryStore::with_entry(CART_STORAGE_KEY, raw),
        None => MemoryStore::new(),
    })
}

/// Write the cart slot of `store` back into the session.
///
/// An empty slot removes the key.
///
/// # Errors
///
/// Returns the session store error.
pub async fn save_cart_slot(
    session: &Session,
    store: &MemoryStore,
) -> Result<(), tower_sessions::session::Error> {
    use crate::cart::KeyValueStore;

    match store.get(CART_STORAGE_KEY) {
        Ok(Some(raw)) => session.insert(keys::CART, raw).await,
        Ok(None) => session.remove::<String>(keys::CART).await.map(|_| ()),
        // MemoryStore reads never fail
        Err(e) => {
            tracing::warn!(error = %e, "Could not read cart slot");
            Ok(())
        }
    }
}
