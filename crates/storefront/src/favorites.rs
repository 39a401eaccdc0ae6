//! Favorites store: a set of product IDs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use despensa_core::ProductId;

use crate::catalog::Catalog;
use crate::models::Product;

/// The shopper's favorite products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoritesStore {
    ids: BTreeSet<ProductId>,
}

impl FavoritesStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns whether it is now a favorite.
    pub fn toggle(&mut self, id: &ProductId) -> bool {
        let added = if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone())
        };
        debug!(product = %id, added, "favorite toggled");
        added
    }

    #[must_use]
    pub fn is_favorite(&self, id: &ProductId) -> bool {
        self.ids.contains(id)
    }

    /// Remove `id`. Returns whether it was present.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        self.ids.remove(id)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> impl Iterator<Item = &ProductId> {
        self.ids.iter()
    }

    /// Favorite products still present in the catalog, in catalog order.
    #[must_use]
    pub fn favorites_in_catalog<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Product> {
        catalog
            .products()
            .iter()
            .filter(|product| self.ids.contains(&product.id))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores_state() {
        let id = ProductId::from("atun-rojo");
        let mut favorites = FavoritesStore::new();
        favorites.toggle(&ProductId::from("pulpo-cocido"));
        let before = favorites.clone();

        assert!(favorites.toggle(&id));
        assert!(favorites.is_favorite(&id));
        assert!(!favorites.toggle(&id));
        assert_eq!(favorites, before);
    }

    #[test]
    fn test_remove_and_count() {
        let mut favorites = FavoritesStore::new();
        favorites.toggle(&ProductId::from("a"));
        favorites.toggle(&ProductId::from("b"));
        assert_eq!(favorites.count(), 2);

        assert!(favorites.remove(&ProductId::from("a")));
        assert!(!favorites.remove(&ProductId::from("a")));
        assert_eq!(favorites.count(), 1);
    }

    #[test]
    fn test_unknown_ids_skipped_in_catalog_projection() {
        let catalog = Catalog::bundled().unwrap();
        let mut favorites = FavoritesStore::new();
        favorites.toggle(&ProductId::from("aceite-oliva"));
        favorites.toggle(&ProductId::from("descatalogado"));
        favorites.toggle(&ProductId::from("gambas-rojas"));

        let names: Vec<&str> = favorites
            .favorites_in_catalog(&catalog)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(names, ["gambas-rojas", "aceite-oliva"]);
    }

    #[test]
    fn test_serializes_as_list() {
        let mut favorites = FavoritesStore::new();
        favorites.toggle(&ProductId::from("yogur-oveja"));
        assert_eq!(serde_json::to_string(&favorites).unwrap(), r#"["yogur-oveja"]"#);
    }
}
