//! Order and invoice projection for the account dashboard.
//!
//! Read-only derivations over a customer's orders and invoices: status and
//! text filters, and the dashboard's summary numbers. The only mutation is
//! [`OrderBook::record_order`], which files an order placed through checkout.

use std::collections::{BTreeMap, HashMap};

use chrono::Days;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use despensa_core::{CurrencyCode, Email, InvoiceId, OrderStatus, Price};

use crate::fixtures;
use crate::models::{Invoice, Order, User};

/// Days between an invoice and its due date.
const PAYMENT_TERMS_DAYS: u64 = 30;

/// One customer's orders and invoices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerHistory {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
}

/// Dashboard summary numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_orders: usize,
    /// Sum of every order that was not cancelled.
    pub total_spent: Price,
    pub by_status: BTreeMap<OrderStatus, usize>,
    /// Orders still pending, processing or shipped.
    pub open_orders: usize,
    /// Sum of invoices awaiting payment.
    pub pending_invoices_amount: Price,
}

impl DashboardStats {
    /// Orders with the given status.
    #[must_use]
    pub fn count(&self, status: OrderStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

fn normalize_search(search: &str) -> Option<String> {
    let search = search.trim();
    (!search.is_empty()).then(|| search.to_lowercase())
}

fn sum(amounts: impl Iterator<Item = Price>) -> Price {
    let total: Decimal = amounts.map(|price| price.amount).sum();
    Price::new(total, CurrencyCode::EUR)
}

impl CustomerHistory {
    /// Orders matching an optional status and a search over the order ID
    /// and item names (case-insensitive). A blank search matches everything.
    #[must_use]
    pub fn filter_orders(&self, status: Option<OrderStatus>, search: &str) -> Vec<&Order> {
        let needle = normalize_search(search);
        self.orders
            .iter()
            .filter(|order| status.is_none_or(|s| order.status == s))
            .filter(|order| {
                needle.as_deref().is_none_or(|needle| {
                    order.id.as_str().to_lowercase().contains(needle) || order.mentions_item(needle)
                })
            })
            .collect()
    }

    /// Invoices matching an optional status and a search over the invoice
    /// ID, the order ID and item names (case-insensitive).
    #[must_use]
    pub fn filter_invoices(&self, status: Option<OrderStatus>, search: &str) -> Vec<&Invoice> {
        let needle = normalize_search(search);
        self.invoices
            .iter()
            .filter(|invoice| status.is_none_or(|s| invoice.status == s))
            .filter(|invoice| {
                needle.as_deref().is_none_or(|needle| {
                    invoice.id.as_str().to_lowercase().contains(needle)
                        || invoice.order_id.as_str().to_lowercase().contains(needle)
                        || invoice
                            .items
                            .iter()
                            .any(|item| item.to_lowercase().contains(needle))
                })
            })
            .collect()
    }

    /// Dashboard summary.
    #[must_use]
    pub fn stats(&self) -> DashboardStats {
        let mut by_status = BTreeMap::new();
        for order in &self.orders {
            *by_status.entry(order.status).or_insert(0) += 1;
        }

        DashboardStats {
            total_orders: self.orders.len(),
            total_spent: sum(self
                .orders
                .iter()
                .filter(|order| order.status != OrderStatus::Cancelled)
                .map(|order| order.total)),
            open_orders: self.orders.iter().filter(|o| o.status.is_open()).count(),
            pending_invoices_amount: sum(self
                .invoices
                .iter()
                .filter(|invoice| invoice.status == OrderStatus::Pending)
                .map(|invoice| invoice.total)),
            by_status,
        }
    }

    /// Newest orders first; orders filed later win ties on the same date.
    #[must_use]
    pub fn recent_orders(&self, limit: usize) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self.orders.iter().rev().collect();
        orders.sort_by(|a, b| b.date.cmp(&a.date));
        orders.truncate(limit);
        orders
    }
}

#[derive(Debug, Deserialize)]
struct CustomerRecord {
    email: Email,
    #[serde(flatten)]
    history: CustomerHistory,
}

#[derive(Debug, Deserialize)]
struct OrdersData {
    customers: Vec<CustomerRecord>,
}

/// Order history of every customer, keyed by normalized email.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    customers: HashMap<String, CustomerHistory>,
}

impl OrderBook {
    /// Parse an order book fixture.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let data: OrdersData = serde_json::from_str(json)?;
        let mut book = Self::default();
        for record in data.customers {
            let entry = book.customers.entry(record.email.normalized()).or_default();
            entry.orders.extend(record.history.orders);
            entry.invoices.extend(record.history.invoices);
        }
        Ok(book)
    }

    /// The bundled sample history.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the bundled fixture is malformed.
    pub fn bundled() -> Result<Self, serde_json::Error> {
        Self::from_json(fixtures::ORDERS_JSON)
    }

    /// History for an email; empty for unknown customers.
    #[must_use]
    pub fn for_email(&self, email: &Email) -> CustomerHistory {
        self.customers
            .get(&email.normalized())
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn for_user(&self, user: &User) -> CustomerHistory {
        self.for_email(&user.email)
    }

    /// File a placed order and issue its pending invoice.
    pub fn record_order(&mut self, email: &Email, order: Order) {
        let invoice = Invoice {
            id: invoice_id_for(&order),
            order_id: order.id.clone(),
            date: order.date,
            due_date: order.date.checked_add_days(Days::new(PAYMENT_TERMS_DAYS)),
            status: OrderStatus::Pending,
            total: order.total,
            items: order.items.iter().map(|item| item.name.clone()).collect(),
        };
        info!(order = %order.id, invoice = %invoice.id, "order recorded");

        let history = self.customers.entry(email.normalized()).or_default();
        history.orders.push(order);
        history.invoices.push(invoice);
    }
}

fn invoice_id_for(order: &Order) -> InvoiceId {
    let id = order.id.as_str();
    InvoiceId::new(id.strip_prefix("ORD-").map_or_else(
        || format!("FAC-{id}"),
        |rest| format!("FAC-{rest}"),
    ))
}
