//! Cart store.
//!
//! An ordered list of line items keyed by product ID, plus the drawer's open
//! flag. Line prices are snapshots taken when the product was first added,
//! so the cart total never moves when the catalog does.
//!
//! Operations are total: unknown product IDs are silent no-ops, and no line
//! ever holds a quantity below one.

pub mod view;

pub use view::{CartItemView, CartView};

use serde::{Deserialize, Serialize};
use tracing::debug;

use despensa_core::{CurrencyCode, Price, ProductId};

use crate::models::{Product, ProductSnapshot};

/// One row of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product: ProductSnapshot,
    /// Always at least one.
    pub quantity: u32,
}

impl CartLineItem {
    /// Snapshot unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.unit_price.times(self.quantity)
    }
}

/// Outcome of [`CartStore::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now holds the requested quantity.
    Updated,
    /// The line already held the requested quantity.
    Unchanged,
    /// A quantity below one was requested. The line is kept; the caller must
    /// confirm with the shopper and then call [`CartStore::remove_item`].
    ConfirmRemoval,
    /// No line for that product.
    NotFound,
}

/// Persisted cart contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    pub lines: Vec<CartLineItem>,
    /// Drawer flag; presentation only, never persisted.
    #[serde(skip)]
    pub is_open: bool,
}

/// The shopper's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartStore {
    state: CartState,
}

impl CartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a cart from persisted state.
    ///
    /// Persisted data is brought back to what the store itself produces:
    /// zero-quantity lines are dropped and repeated product IDs are merged
    /// into the first line, keeping its snapshot.
    #[must_use]
    pub fn from_state(state: CartState) -> Self {
        let mut lines: Vec<CartLineItem> = Vec::with_capacity(state.lines.len());
        for line in state.lines.into_iter().filter(|line| line.quantity > 0) {
            match lines.iter_mut().find(|kept| kept.product.id == line.product.id) {
                Some(kept) => kept.quantity = kept.quantity.saturating_add(line.quantity),
                None => lines.push(line),
            }
        }
        Self {
            state: CartState { lines, ..state },
        }
    }

    /// The state to persist.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        &self.state.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lines.is_empty()
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn line(&self, id: &ProductId) -> Option<&CartLineItem> {
        self.state.lines.iter().find(|line| line.product.id == *id)
    }

    fn line_mut(&mut self, id: &ProductId) -> Option<&mut CartLineItem> {
        self.state
            .lines
            .iter_mut()
            .find(|line| line.product.id == *id)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of a product.
    ///
    /// Merges into the existing line when the product is already in the cart;
    /// the existing line keeps its original snapshot price. A zero quantity is
    /// a no-op.
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            debug!(product = %product.id, "ignoring add of zero units");
            return;
        }

        if let Some(line) = self.line_mut(&product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            debug!(product = %product.id, quantity = line.quantity, "cart line merged");
        } else {
            self.state.lines.push(CartLineItem {
                product: ProductSnapshot::from(product),
                quantity,
            });
            debug!(product = %product.id, quantity, "cart line added");
        }
    }

    /// Set a line's quantity to exactly `quantity`.
    ///
    /// Zero never deletes; it asks the caller to confirm removal.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: u32) -> QuantityChange {
        let Some(line) = self.line_mut(id) else {
            return QuantityChange::NotFound;
        };

        if quantity == 0 {
            return QuantityChange::ConfirmRemoval;
        }
        if line.quantity == quantity {
            return QuantityChange::Unchanged;
        }

        line.quantity = quantity;
        debug!(product = %id, quantity, "cart quantity updated");
        QuantityChange::Updated
    }

    /// Add one unit to an existing line.
    pub fn increment(&mut self, id: &ProductId) -> QuantityChange {
        match self.line(id).map(|line| line.quantity) {
            Some(current) => self.update_quantity(id, current.saturating_add(1)),
            None => QuantityChange::NotFound,
        }
    }

    /// Take one unit off an existing line. From one unit this asks for
    /// removal confirmation instead.
    pub fn decrement(&mut self, id: &ProductId) -> QuantityChange {
        match self.line(id).map(|line| line.quantity) {
            Some(current) => self.update_quantity(id, current.saturating_sub(1)),
            None => QuantityChange::NotFound,
        }
    }

    /// Remove a line regardless of quantity. Returns whether a line was removed.
    pub fn remove_item(&mut self, id: &ProductId) -> bool {
        let before = self.state.lines.len();
        self.state.lines.retain(|line| line.product.id != *id);
        let removed = self.state.lines.len() != before;
        if removed {
            debug!(product = %id, "cart line removed");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.state.lines.clear();
        debug!("cart cleared");
    }

    // =========================================================================
    // Derived Totals
    // =========================================================================

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.state
            .lines
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    /// Sum of snapshot price times quantity.
    #[must_use]
    pub fn total_price(&self) -> Price {
        let currency = self
            .state
            .lines
            .first()
            .map_or(CurrencyCode::EUR, |line| line.product.unit_price.currency_code);
        let amount = self
            .state
            .lines
            .iter()
            .map(|line| line.line_total().amount)
            .sum();
        Price::new(amount, currency)
    }

    // =========================================================================
    // Drawer
    // =========================================================================

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub const fn toggle_cart(&mut self) {
        self.state.is_open = !self.state.is_open;
    }

    pub const fn open_cart(&mut self) {
        self.state.is_open = true;
    }

    pub const fn close_cart(&mut self) {
        self.state.is_open = false;
    }
}
