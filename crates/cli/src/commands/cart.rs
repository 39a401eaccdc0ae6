//! Cart commands.

use despensa_core::ProductId;
use despensa_storefront::AppError;
use despensa_storefront::cart::{CartView, QuantityChange};

use super::Shop;

/// The cart drawer as text.
#[must_use]
pub fn show(shop: &Shop) -> String {
    let view = CartView::from(&shop.session.cart);
    if view.is_empty() {
        return "Your cart is empty.".to_string();
    }

    let mut lines: Vec<String> = view
        .items
        .iter()
        .map(|item| {
            let stock = if item.in_stock { "" } else { " [out of stock]" };
            format!(
                "{:>3} × {:<32} {:>10} {:>10}{stock}",
                item.quantity, item.name, item.price, item.line_price
            )
        })
        .collect();

    let summary = &view.summary;
    lines.push(String::new());
    lines.push(format!("Items:    {}", view.item_count));
    lines.push(format!("Subtotal: {}", summary.subtotal));
    lines.push(format!(
        "Shipping: {}",
        if summary.free_shipping() {
            "free".to_string()
        } else {
            summary.shipping.to_string()
        }
    ));
    lines.push(format!("VAT:      {}", summary.tax));
    lines.push(format!("Total:    {}", summary.total));
    if let Some(hint) = &view.free_shipping_hint {
        lines.push(format!("Add {hint} more for free shipping."));
    }
    lines.join("\n")
}

/// Add a product, merging with an existing line.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown product.
pub fn add(shop: &mut Shop, id: &str, quantity: u32) -> Result<String, AppError> {
    let product = shop.product(id)?.clone();
    shop.session.cart.add_item(&product, quantity);

    let in_cart = shop
        .session
        .cart
        .line(&product.id)
        .map_or(0, |line| line.quantity);
    let mut message = format!("{} in cart: {in_cart}", product.name);
    if !product.in_stock {
        message.push_str(" (currently out of stock)");
    }
    Ok(message)
}

/// Set a line's quantity. Zero removes the line only with `confirm`.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the product is not in the cart.
pub fn set(shop: &mut Shop, id: &str, quantity: u32, confirm: bool) -> Result<String, AppError> {
    let product_id = ProductId::from(id);
    match shop.session.cart.update_quantity(&product_id, quantity) {
        QuantityChange::Updated | QuantityChange::Unchanged => Ok(format!("{id}: {quantity}")),
        QuantityChange::ConfirmRemoval if confirm => {
            shop.session.cart.remove_item(&product_id);
            Ok(format!("Removed {id}."))
        }
        QuantityChange::ConfirmRemoval => Ok(format!(
            "Setting {id} to 0 removes it from the cart. Repeat with --confirm to remove it."
        )),
        QuantityChange::NotFound => Err(not_in_cart(id)),
    }
}

/// Remove a line.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the product is not in the cart.
pub fn remove(shop: &mut Shop, id: &str) -> Result<String, AppError> {
    if shop.session.cart.remove_item(&ProductId::from(id)) {
        Ok(format!("Removed {id}."))
    } else {
        Err(not_in_cart(id))
    }
}

/// Empty the cart.
pub fn clear(shop: &mut Shop) -> String {
    shop.session.cart.clear();
    "Cart cleared.".to_string()
}

fn not_in_cart(id: &str) -> AppError {
    AppError::NotFound(format!("Product {id} in the cart"))
}
