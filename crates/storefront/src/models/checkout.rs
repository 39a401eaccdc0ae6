//! Shipping and payment options offered during checkout.

use core::fmt;

use serde::{Deserialize, Serialize};

use despensa_core::{AddressId, PaymentMethodId};

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub id: AddressId,
    /// Short name ("Restaurante", "Almacén").
    pub label: String,
    pub recipient: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub province: String,
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
}

impl fmt::Display for ShippingAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}, {} {} ({})",
            self.label, self.street, self.postal_code, self.city, self.province
        )
    }
}

/// How a payment method charges the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentKind {
    Card { brand: String, last4: String },
    Transfer { iban_suffix: String },
    CashOnDelivery,
}

/// A saved payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub kind: PaymentKind,
    #[serde(default)]
    pub is_default: bool,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PaymentKind::Card { brand, last4 } => write!(f, "{brand} •••• {last4}"),
            PaymentKind::Transfer { iban_suffix } => write!(f, "Transferencia (…{iban_suffix})"),
            PaymentKind::CashOnDelivery => f.write_str("Pago contra reembolso"),
        }
    }
}
