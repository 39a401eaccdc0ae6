//! Favorites commands.

use despensa_storefront::AppError;

use super::Shop;

/// Favorite products in catalog order.
#[must_use]
pub fn list(shop: &Shop) -> String {
    let favorites = shop
        .session
        .favorites
        .favorites_in_catalog(shop.state.catalog());
    if favorites.is_empty() {
        return "No favorites yet.".to_string();
    }
    favorites
        .iter()
        .map(|product| format!("♥ {:<22} {}", product.id, product.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Add or remove a favorite.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown product.
pub fn toggle(shop: &mut Shop, id: &str) -> Result<String, AppError> {
    let product = shop.product(id)?;
    let (product_id, name) = (product.id.clone(), product.name.clone());
    if shop.session.favorites.toggle(&product_id) {
        Ok(format!("Added {name} to favorites."))
    } else {
        Ok(format!("Removed {name} from favorites."))
    }
}
