//! Catalog product types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use despensa_core::{BrandId, CategoryId, Price, ProductId};

/// A product category (e.g., "mar" - fish and seafood).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A product brand or producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
}

/// A catalog product.
///
/// Immutable reference data: products are loaded once and never created or
/// destroyed at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID (URL slug).
    pub id: ProductId,
    pub name: String,
    pub category: CategoryId,
    pub brand: BrandId,
    /// Current unit price.
    pub price: Price,
    /// Price before discount, shown struck through.
    #[serde(default)]
    pub original_price: Option<Price>,
    /// Discount percentage (0-100).
    #[serde(default)]
    pub discount: Option<u8>,
    /// Unit the price applies to (e.g., "kg", "bandeja 500 g").
    pub units: String,
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
    /// Image URLs, primary first.
    #[serde(default)]
    pub images: Vec<String>,
    /// Average review rating (0-5).
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub preparation: Option<String>,
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Product {
    /// The primary image, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Discount percentage, treating a missing discount as zero.
    #[must_use]
    pub fn discount_percent(&self) -> u8 {
        self.discount.unwrap_or(0)
    }

    /// Whether the product is currently on offer.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.discount_percent() > 0
    }

    /// Amount saved per unit against the original price.
    #[must_use]
    pub fn savings(&self) -> Option<Price> {
        let original = self.original_price?;
        (original.amount > self.price.amount).then(|| {
            Price::new(original.amount - self.price.amount, self.price.currency_code)
        })
    }

    /// Check the numeric invariants of a product.
    ///
    /// Returns a description of the first violated constraint.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.price.amount < Decimal::ZERO {
            return Err("price cannot be negative".to_string());
        }
        if let Some(original) = self.original_price
            && original.currency_code != self.price.currency_code
        {
            return Err("original price uses a different currency".to_string());
        }
        if self.discount.is_some_and(|d| d > 100) {
            return Err("discount must be between 0 and 100".to_string());
        }
        if self.rating.is_some_and(|r| !(0.0..=5.0).contains(&r)) {
            return Err("rating must be between 0 and 5".to_string());
        }
        Ok(())
    }
}

/// The product data a cart line keeps from the moment it was added.
///
/// The unit price is frozen here so later catalog price changes never alter
/// an existing cart total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub category: CategoryId,
    pub unit_price: Price,
    pub units: String,
    pub image: Option<String>,
    #[serde(default = "in_stock_default")]
    pub in_stock: bool,
}

const fn in_stock_default() -> bool {
    true
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            unit_price: product.price,
            units: product.units.clone(),
            image: product.primary_image().map(str::to_owned),
            in_stock: product.in_stock,
        }
    }
}
