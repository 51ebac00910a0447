//! Checkout: turn the cart into an order.

use pawcare_core::{ContactError, Email, PhoneNumber, Price, PriceError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::api::{ApiError, Order, OrderRequest, PetCareClient, ShippingInfo, with_cancellation};
use crate::cart::{CartItem, CartStore, KeyValueStore, checked_total};

/// Errors that stop an order from being placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing to order.
    #[error("Your cart is empty")]
    EmptyCart,

    /// One or more shipping fields are blank.
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// The phone number does not reduce to exactly ten digits.
    #[error("Please enter a valid 10-digit phone number")]
    InvalidPhone,

    /// The email address is malformed.
    #[error("Please enter a valid email address: {0}")]
    InvalidEmail(ContactError),

    /// The cart total could not be expressed as a price.
    #[error("Invalid cart total: {0}")]
    Total(#[from] PriceError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Shipping details as typed into the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
}

impl ShippingForm {
    /// Check every field and produce the wire shape.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingFields`], then
    /// [`CheckoutError::InvalidPhone`], then [`CheckoutError::InvalidEmail`].
    pub fn validate(&self) -> Result<ShippingInfo, CheckoutError> {
        let missing: Vec<&'static str> = [
            (&self.full_name, "full name"),
            (&self.email, "email"),
            (&self.phone, "phone"),
            (&self.address, "address"),
            (&self.city, "city"),
            (&self.postal_code, "postal code"),
        ]
        .into_iter()
        .filter(|(value, _)| value.trim().is_empty())
        .map(|(_, name)| name)
        .collect();
        if !missing.is_empty() {
            return Err(CheckoutError::MissingFields(missing));
        }

        let phone = PhoneNumber::parse(&self.phone).map_err(|_| CheckoutError::InvalidPhone)?;
        let email = Email::parse(&self.email).map_err(CheckoutError::InvalidEmail)?;

        Ok(ShippingInfo {
            full_name: self.full_name.trim().to_string(),
            email,
            phone,
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
        })
    }
}

/// Compose an order body from cart lines and shipping details.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] when `items` is empty, or
/// [`CheckoutError::Total`] when the total does not fit in a price.
pub fn compose_order(
    items: &[CartItem],
    shipping: ShippingInfo,
) -> Result<OrderRequest, CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let total = Price::new(checked_total(items)?)?;
    Ok(OrderRequest {
        items: items.to_vec(),
        total,
        shipping,
    })
}

/// Validate, place the order, and clear the cart once the API accepts it.
///
/// The cart is untouched when anything fails. If the order is accepted but
/// clearing the cart cannot be persisted, the order is still returned.
///
/// # Errors
///
/// Returns a validation error before any network call, or the API error.
#[instrument(skip_all, fields(items = cart.len()))]
pub async fn place_order<S: KeyValueStore>(
    cart: &mut CartStore<S>,
    client: &PetCareClient,
    form: &ShippingForm,
    cancel: &CancellationToken,
) -> Result<Order, CheckoutError> {
    let shipping = form.validate()?;
    let request = compose_order(cart.items(), shipping)?;

    let order = with_cancellation(cancel, client.place_order(&request)).await?;
    info!(order_id = %order.id, total = %request.total, "Order placed");

    if let Err(e) = cart.clear() {
        warn!(error = %e, order_id = %order.id, "Order placed but cart could not be cleared");
    }
    Ok(order)
}
