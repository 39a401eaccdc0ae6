//! Shopper session: the cart, favorites and auth stores of one shopper,
//! restored from and saved to local storage.

use serde::{Deserialize, Serialize};
use tracing::debug;

use despensa_core::Email;

use crate::auth::AuthStore;
use crate::cart::{CartState, CartStore};
use crate::checkout::OrderConfirmation;
use crate::favorites::FavoritesStore;
use crate::models::session::keys;
use crate::models::{AuthState, Order};
use crate::orders::OrderBook;
use crate::storage::{KeyValueStore, Storage, StorageError};

/// An order placed through checkout on this device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub customer: Email,
    pub order: Order,
}

/// Every store of one shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopperSession {
    pub cart: CartStore,
    pub favorites: FavoritesStore,
    pub auth: AuthStore,
    pub placed_orders: Vec<PlacedOrder>,
}

impl ShopperSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a session. Missing or corrupt entries start fresh.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself cannot be read.
    pub fn load<S: KeyValueStore>(storage: &Storage<S>) -> Result<Self, StorageError> {
        let session = Self {
            cart: CartStore::from_state(storage.load::<CartState>(keys::CART)?.unwrap_or_default()),
            favorites: storage.load(keys::FAVORITES)?.unwrap_or_default(),
            auth: AuthStore::from_state(storage.load::<AuthState>(keys::AUTH)?.unwrap_or_default()),
            placed_orders: storage.load(keys::PLACED_ORDERS)?.unwrap_or_default(),
        };
        debug!(
            cart_items = session.cart.total_items(),
            favorites = session.favorites.count(),
            authenticated = session.auth.is_authenticated(),
            "session loaded"
        );
        Ok(session)
    }

    /// Persist every store.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be written.
    pub fn save<S: KeyValueStore>(&self, storage: &Storage<S>) -> Result<(), StorageError> {
        storage.save(keys::CART, self.cart.state())?;
        storage.save(keys::FAVORITES, &self.favorites)?;
        storage.save(keys::AUTH, self.auth.state())?;
        storage.save(keys::PLACED_ORDERS, &self.placed_orders)?;
        Ok(())
    }

    /// Remember an order placed by the logged-in user.
    ///
    /// Guest orders are not kept: there is no account to show them under.
    pub fn remember_order(&mut self, confirmation: &OrderConfirmation) {
        if let Some(user) = self.auth.user() {
            self.placed_orders.push(PlacedOrder {
                customer: user.email.clone(),
                order: confirmation.order.clone(),
            });
        }
    }

    /// The sample order book plus the orders placed on this device.
    #[must_use]
    pub fn order_book(&self, base: &OrderBook) -> OrderBook {
        let mut book = base.clone();
        for placed in &self.placed_orders {
            book.record_order(&placed.customer, placed.order.clone());
        }
        book
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use despensa_core::ProductId;

    use super::*;
    use crate::catalog::Catalog;
    use crate::storage::MemoryStore;

    #[test]
    fn test_round_trip() {
        let catalog = Catalog::bundled().unwrap();
        let storage = Storage::new(MemoryStore::new(), "despensa");

        let mut session = ShopperSession::new();
        session
            .cart
            .add_item(catalog.get(&ProductId::from("atun-rojo")).unwrap(), 2);
        session.cart.open_cart();
        session.favorites.toggle(&ProductId::from("queso-manchego"));
        session.save(&storage).unwrap();

        let restored = ShopperSession::load(&storage).unwrap();
        assert_eq!(restored.cart.lines(), session.cart.lines());
        assert!(!restored.cart.is_open());
        assert_eq!(restored.favorites, session.favorites);
        assert!(!restored.auth.is_authenticated());
    }

    #[test]
    fn test_corrupt_entries_start_fresh() {
        let storage = Storage::new(MemoryStore::new(), "despensa");
        storage.store().set("despensa:cart", "[[[").unwrap();
        storage.store().set("despensa:favorites", "42").unwrap();

        let session = ShopperSession::load(&storage).unwrap();
        assert_eq!(session, ShopperSession::new());
    }
}
