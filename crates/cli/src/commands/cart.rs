//! Local cart commands.
//!
//! The cart is a `cart.json` file under the data directory, in the same JSON
//! shape the web storefront keeps in the browser.

use std::path::Path;
use std::str::FromStr;

use pawcare_core::{ItemId, Price, format_amount};
use pawcare_storefront::cart::{CartProduct, CartStore, FileStore};

use super::CliError;

/// Open the cart under `data_dir`. A missing or unreadable file is an empty cart.
pub fn open(data_dir: &Path) -> CartStore<FileStore> {
    CartStore::open(FileStore::new(data_dir))
}

/// Add `quantity` units of a product.
///
/// # Errors
///
/// Returns an error if the price does not parse or the cart cannot be saved.
pub fn add(
    cart: &mut CartStore<FileStore>,
    id: String,
    name: String,
    price: &str,
    image: Option<String>,
    quantity: u32,
) -> Result<(), CliError> {
    let mut product = CartProduct::new(id, name, Price::from_str(price)?);
    if let Some(image) = image {
        product = product.with_image(image);
    }
    cart.add_item(&product, quantity)?;
    Ok(())
}

/// Take one unit away.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub fn subtract(cart: &mut CartStore<FileStore>, id: String) -> Result<(), CliError> {
    cart.subtract_item(&ItemId::new(id))?;
    Ok(())
}

/// Remove a product entirely.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub fn remove(cart: &mut CartStore<FileStore>, id: String) -> Result<(), CliError> {
    cart.remove_item(&ItemId::new(id))?;
    Ok(())
}

/// Set a product's quantity.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub fn set(cart: &mut CartStore<FileStore>, id: String, quantity: i64) -> Result<(), CliError> {
    cart.update_quantity(&ItemId::new(id), quantity)?;
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub fn clear(cart: &mut CartStore<FileStore>) -> Result<(), CliError> {
    cart.clear()?;
    Ok(())
}

/// Render the cart as text.
pub fn render(cart: &CartStore<FileStore>) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::new();
    for item in cart.items() {
        let name = if item.name.is_empty() {
            item.id.as_str()
        } else {
            item.name.as_str()
        };
        out.push_str(&format!(
            "{:>4} x {name} [{}] @ {} = {}\n",
            item.quantity,
            item.id,
            item.price,
            item.line_total().map_or_else(|e| e.to_string(), format_amount)
        ));
    }
    out.push_str(&format!(
        "{} item(s), total {}\n",
        cart.item_count(),
        format_amount(cart.total())
    ));
    out
}

/// Print the cart.
#[allow(clippy::print_stdout)]
pub fn show(cart: &CartStore<FileStore>) {
    print!("{}", render(cart));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_persist_between_opens() {
        let dir = tempfile::tempdir().unwrap();

        let mut cart = open(dir.path());
        add(&mut cart, "kibble".into(), "Kibble".into(), "24.99", None, 2).unwrap();
        add(&mut cart, "collar".into(), String::new(), "5", None, 1).unwrap();
        subtract(&mut cart, "kibble".into()).unwrap();

        let reopened = open(dir.path());
        assert_eq!(reopened.item_count(), 2);
        let text = render(&reopened);
        assert!(text.contains("1 x Kibble [kibble]"));
        assert!(text.contains("1 x collar [collar]"));
        assert!(text.contains("total $29.99"));
    }

    #[test]
    fn test_set_to_zero_removes() {
        let dir = tempfile::tempdir().unwrap();
        let mut cart = open(dir.path());
        add(&mut cart, "kibble".into(), "Kibble".into(), "24.99", None, 2).unwrap();
        set(&mut cart, "kibble".into(), -1).unwrap();
        assert!(open(dir.path()).is_empty());
        assert_eq!(render(&cart), "Cart is empty\n");
    }

    #[test]
    fn test_bad_price_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut cart = open(dir.path());
        let err = add(&mut cart, "kibble".into(), "Kibble".into(), "cheap", None, 1).unwrap_err();
        assert!(matches!(err, CliError::Price(_)));
        assert!(cart.is_empty());
    }
}
