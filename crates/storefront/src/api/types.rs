//! Wire types for the PawCare REST API.
//!
//! Field names follow the API's camelCase JSON. Records coming back from the
//! API may key their identifier as `_id`; both spellings are accepted.

use chrono::{DateTime, NaiveDate, Utc};
use pawcare_core::{BookingId, BookingStatus, Email, ItemId, OrderId, OrderStatus, PhoneNumber, Price};
use serde::{Deserialize, Serialize};

use crate::cart::{CartItem, CartProduct};

// =============================================================================
// Catalog
// =============================================================================

/// A product or vaccine from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ItemId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: Some(product.id.clone()),
            fallback_id: None,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
        }
    }
}

// =============================================================================
// Bookings
// =============================================================================

/// The composed payload for a new vaccination booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub product_id: ItemId,
    pub product_name: String,
    pub appointment_date: NaiveDate,
    pub time_slot: String,
    pub owner_name: String,
    pub email: Email,
    pub phone: PhoneNumber,
    pub address: String,
    pub pet_name: String,
    pub pet_type: String,
    pub breed: String,
    pub pet_age: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A booking record as stored by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(alias = "_id")]
    pub id: BookingId,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub details: BookingDraft,
}

/// New appointment slot for an existing booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    pub appointment_date: NaiveDate,
    pub time_slot: String,
}

// =============================================================================
// Orders
// =============================================================================

/// Validated shipping details for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub full_name: String,
    pub email: Email,
    pub phone: PhoneNumber,
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

/// Body for placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<CartItem>,
    pub total: Price,
    pub shipping: ShippingInfo,
}

/// An order record as stored by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub total: Price,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Error payload returned by the API on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// The human-readable message, if the body carried one.
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}
