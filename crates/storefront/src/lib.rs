//! PawCare storefront library.
//!
//! The cart store and its persistence bridge, the booking wizard and
//! booking management flows, checkout, the PawCare API client, and the JSON
//! HTTP service that puts them behind a session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod booking;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
