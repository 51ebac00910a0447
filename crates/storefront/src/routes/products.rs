//! Product route handlers.
//!
//! Thin proxies over the cached catalog.

use axum::{
    Json,
    extract::{Path, State},
};
use pawcare_core::ItemId;
use tracing::instrument;

use crate::api::Product;
use crate::error::Result;
use crate::state::AppState;

/// List the catalog.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.client().list_products().await?;
    Ok(Json(products.as_slice().to_vec()))
}

/// Show one product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let product = state.client().get_product(&ItemId::new(id)).await?;
    Ok(Json(product))
}
