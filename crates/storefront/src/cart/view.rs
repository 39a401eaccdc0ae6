//! Cart drawer display data.
//!
//! The drawer shows the same summary the checkout does: both go through
//! [`pricing::summarize`].

use serde::Serialize;

use super::{CartLineItem, CartStore};
use crate::checkout::pricing::{self, PriceSummary};

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub units: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: Option<String>,
    pub in_stock: bool,
}

/// Cart drawer display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u64,
    pub is_open: bool,
    pub summary: PriceSummary,
    /// Formatted amount still needed for free shipping, if any.
    pub free_shipping_hint: Option<String>,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&CartStore> for CartView {
    fn from(cart: &CartStore) -> Self {
        let summary = pricing::summarize(cart.total_price(), false);
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            item_count: cart.total_items(),
            is_open: cart.is_open(),
            free_shipping_hint: summary
                .remaining_for_free_shipping()
                .filter(|_| !cart.is_empty())
                .map(|remaining| remaining.to_string()),
            summary,
        }
    }
}

impl From<&CartLineItem> for CartItemView {
    fn from(line: &CartLineItem) -> Self {
        Self {
            id: line.product.id.to_string(),
            name: line.product.name.clone(),
            units: line.product.units.clone(),
            quantity: line.quantity,
            price: line.product.unit_price.to_string(),
            line_price: line.line_total().to_string(),
            image: line.product.image.clone(),
            in_stock: line.product.in_stock,
        }
    }
}
