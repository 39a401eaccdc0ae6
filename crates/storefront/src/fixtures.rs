//! Bundled sample data.
//!
//! The storefront ships with a static catalog, sample order/invoice history
//! for the demo accounts, and the saved addresses and payment methods offered
//! at checkout. There is no backend: these stand in for its read endpoints.

use serde::Deserialize;

use crate::models::{PaymentMethod, ShippingAddress, User};

/// Catalog data: categories, brands and products.
pub const CATALOG_JSON: &str = include_str!("../data/catalog.json");

/// Order and invoice history keyed by customer email.
pub const ORDERS_JSON: &str = include_str!("../data/orders.json");

/// Saved addresses and payment methods.
pub const CHECKOUT_JSON: &str = include_str!("../data/checkout.json");

/// Email of the demo account.
pub const DEMO_EMAIL: &str = "demo@despensa.es";

/// Password of the demo account.
pub const DEMO_PASSWORD: &str = "despensa2024";

/// Email of the second sample customer.
pub const SECOND_EMAIL: &str = "compras@restaurantemar.es";

/// Password of the second sample customer.
pub const SECOND_PASSWORD: &str = "mariscos-frescos";

#[derive(Debug, Deserialize)]
struct CheckoutData {
    addresses: Vec<ShippingAddress>,
    payment_methods: Vec<PaymentMethod>,
}

/// Addresses and payment methods the checkout steps choose from.
#[derive(Debug, Clone, Default)]
pub struct CheckoutOptions {
    pub addresses: Vec<ShippingAddress>,
    pub payment_methods: Vec<PaymentMethod>,
}

impl CheckoutOptions {
    /// The bundled options.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the bundled fixture is malformed.
    pub fn bundled() -> Result<Self, serde_json::Error> {
        let data: CheckoutData = serde_json::from_str(CHECKOUT_JSON)?;
        Ok(Self {
            addresses: data.addresses,
            payment_methods: data.payment_methods,
        })
    }
}

/// Demo accounts as `(user, password)` pairs.
///
/// # Errors
///
/// Returns an error only if a bundled email literal is malformed.
pub fn demo_accounts() -> Result<Vec<(User, &'static str)>, despensa_core::EmailError> {
    Ok(vec![
        (
            User {
                name: "Lucía Fernández".to_string(),
                email: despensa_core::Email::parse(DEMO_EMAIL)?,
                company: "Restaurante El Puerto".to_string(),
                phone: "+34 942 123 456".to_string(),
            },
            DEMO_PASSWORD,
        ),
        (
            User {
                name: "Javier Ortiz".to_string(),
                email: despensa_core::Email::parse(SECOND_EMAIL)?,
                company: "Marisquería La Bahía".to_string(),
                phone: "+34 942 987 654".to_string(),
            },
            SECOND_PASSWORD,
        ),
    ])
}
