//! Type-safe price representation using decimal arithmetic.
//!
//! Prices cross two boundaries that disagree about their encoding: the
//! remote catalog API sends JSON numbers, while older snapshots sometimes
//! carry quoted strings. [`Price`] accepts both on input and always writes a
//! JSON number, so a persisted cart stays readable by the web client.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// An amount derived from prices does not fit in a decimal.
    #[error("amount is too large")]
    Overflow,
}

/// A non-negative unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount.normalize()))
    }

    /// Create a price from a whole number of cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `cents` is below zero.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price multiplied by a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the product does not fit in a decimal.
    pub fn line_total(&self, quantity: u32) -> Result<Decimal, PriceError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .ok_or(PriceError::Overflow)
    }

    /// Format for display with two decimal places (e.g. `$19.99`).
    #[must_use]
    pub fn display(&self) -> String {
        format_amount(self.0)
    }
}

/// Format any decimal amount as dollars with two decimal places.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0.to_string())
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Whole amounts go out as integers so `10` doesn't become `10.0`.
        if self.0.fract().is_zero()
            && let Some(whole) = self.0.to_u64()
        {
            return serializer.serialize_u64(whole);
        }
        // Amounts a double can't carry exactly are written as strings, which
        // the deserializer accepts, so reloading never changes the price.
        match self.0.to_f64() {
            Some(value) if round_trips(value, self.0) => serializer.serialize_f64(value),
            _ => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

fn round_trips(value: f64, amount: Decimal) -> bool {
    Decimal::from_str(&value.to_string()).is_ok_and(|parsed| parsed.normalize() == amount.normalize())
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative number or numeric string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Price::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Price::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() {
            return Err(E::custom(PriceError::Invalid(v.to_string())));
        }
        // Shortest round-trip formatting keeps 10.99 as 10.99 rather than
        // the nearest binary fraction.
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}
