//! Catalog query parameters: filters, sort order and paging.

use core::fmt;
use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use despensa_core::{BrandId, CategoryId};

use super::collate;
use crate::models::Product;

/// Value used by the listing UI for "no category/brand filter".
pub const ALL: &str = "all";

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    /// Create a range, swapping the bounds if they arrive reversed.
    #[must_use]
    pub fn new(min: Decimal, max: Decimal) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Whether `amount` lies within the range (both ends inclusive).
    #[must_use]
    pub fn contains(&self, amount: Decimal) -> bool {
        self.min <= amount && amount <= self.max
    }
}

/// Conjunction of product predicates.
///
/// Every clause that is set must hold for a product to match. The default
/// filter matches the whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring matched against name or description.
    pub search: Option<String>,
    /// `None` means all categories.
    pub category: Option<CategoryId>,
    /// `None` means all brands.
    pub brand: Option<BrandId>,
    pub price_range: Option<PriceRange>,
    pub discounted_only: bool,
    pub in_stock_only: bool,
    pub featured_only: bool,
}

impl ProductFilter {
    /// Set the search text. Blank text clears the clause.
    #[must_use]
    pub fn with_search(mut self, text: &str) -> Self {
        let text = text.trim();
        self.search = (!text.is_empty()).then(|| text.to_owned());
        self
    }

    /// Set the category from a listing value, where `"all"` clears it.
    #[must_use]
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = selection(category).map(CategoryId::from);
        self
    }

    /// Set the brand from a listing value, where `"all"` clears it.
    #[must_use]
    pub fn with_brand(mut self, brand: &str) -> Self {
        self.brand = selection(brand).map(BrandId::from);
        self
    }

    #[must_use]
    pub const fn with_price_range(mut self, range: PriceRange) -> Self {
        self.price_range = Some(range);
        self
    }

    #[must_use]
    pub const fn discounted_only(mut self) -> Self {
        self.discounted_only = true;
        self
    }

    #[must_use]
    pub const fn in_stock_only(mut self) -> Self {
        self.in_stock_only = true;
        self
    }

    #[must_use]
    pub const fn featured_only(mut self) -> Self {
        self.featured_only = true;
        self
    }

    /// Evaluate the filter against one product.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = product.name.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        self.category.as_ref().is_none_or(|c| *c == product.category)
            && self.brand.as_ref().is_none_or(|b| *b == product.brand)
            && self
                .price_range
                .is_none_or(|range| range.contains(product.price.amount))
            && (!self.discounted_only || product.is_discounted())
            && (!self.in_stock_only || product.in_stock)
            && (!self.featured_only || product.featured)
    }
}

fn selection(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty() && !value.eq_ignore_ascii_case(ALL)).then_some(value)
}

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Featured products first, catalog order otherwise.
    #[default]
    Featured,
    /// Name ascending (Spanish collation).
    Name,
    PriceAsc,
    PriceDesc,
    /// Highest discount first; no discount counts as zero.
    Discount,
}

impl SortOrder {
    pub const ALL: [Self; 5] = [
        Self::Featured,
        Self::Name,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::Discount,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::Name => "name",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Discount => "discount",
        }
    }

    /// Ordering of two products under this sort key.
    ///
    /// Used with a stable sort, so `Equal` keeps catalog order.
    #[must_use]
    pub fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Featured => b.featured.cmp(&a.featured),
            Self::Name => collate::compare(&a.name, &b.name),
            Self::PriceAsc => a.price.amount.cmp(&b.price.amount),
            Self::PriceDesc => b.price.amount.cmp(&a.price.amount),
            Self::Discount => b.discount_percent().cmp(&a.discount_percent()),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unknown sort key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort order: {0}")]
pub struct ParseSortError(pub String);

impl FromStr for SortOrder {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|order| order.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseSortError(s.to_owned()))
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<'a> {
    pub items: Vec<&'a Product>,
    /// Matches before paging.
    pub total_count: usize,
    /// 1-indexed page that was requested.
    pub page: usize,
    pub page_size: usize,
    /// Zero when nothing matches.
    pub total_pages: usize,
}

impl QueryResult<'_> {
    /// Whether a page exists after this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether a page exists before this one.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}
