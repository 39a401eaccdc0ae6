//! Order and invoice records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use despensa_core::{InvoiceId, OrderId, OrderStatus, Price, ProductId};

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Catalog product, when the line still maps to one.
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Price,
}

impl OrderItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub date: NaiveDate,
    pub status: OrderStatus,
    /// Amount charged, taxes and shipping included.
    pub total: Price,
    pub items: Vec<OrderItem>,
    /// Delivery address label shown in the order detail.
    #[serde(default)]
    pub shipping_address: Option<String>,
    /// Payment method label shown in the order detail.
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl Order {
    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Whether any line name contains `needle` (already lowercased).
    pub(crate) fn mentions_item(&self, needle: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.name.to_lowercase().contains(needle))
    }
}

/// An invoice issued for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub order_id: OrderId,
    pub date: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub total: Price,
    /// Item names copied from the order, used for search.
    #[serde(default)]
    pub items: Vec<String>,
}
