//! PawCare Core - Shared types library.
//!
//! This crate provides common types used across all PawCare components:
//! - `storefront` - Cart store, booking flows, and the HTTP service
//! - `cli` - Command-line tools for the cart and bookings
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for identifiers, prices, contact details, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
