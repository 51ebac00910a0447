//! Catalog commands.

use tokio_util::sync::CancellationToken;

use pawcare_storefront::api::with_cancellation;

use super::{CliError, client};

/// Print the catalog.
///
/// # Errors
///
/// Returns an error if configuration is missing or the API call fails.
#[allow(clippy::print_stdout)]
pub async fn list(cancel: &CancellationToken) -> Result<(), CliError> {
    let client = client()?;
    let products = with_cancellation(cancel, client.list_products()).await?;

    for product in products.iter() {
        let category = product.category.as_deref().unwrap_or("-");
        println!("{:<24} {:<12} {:>10}  {}", product.id, category, product.price, product.name);
    }
    Ok(())
}
