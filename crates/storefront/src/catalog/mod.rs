//! Product catalog index.
//!
//! Holds the static product list with its categories and brands and answers
//! listing queries (filter, sort, paginate). Queries are pure: identical
//! inputs always return the same items in the same order, because sorting is
//! stable over catalog order.
//!
//! # Example
//!
//! ```rust
//! use despensa_storefront::catalog::{Catalog, ProductFilter, SortOrder};
//!
//! let catalog = Catalog::bundled().unwrap();
//! let filter = ProductFilter::default().with_category("mar").in_stock_only();
//! let page = catalog.query(&filter, SortOrder::PriceAsc, 1);
//!
//! assert!(page.items.iter().all(|p| p.category.as_str() == "mar"));
//! ```

mod collate;
mod query;

pub use collate::{collation_key, compare as compare_names};
pub use query::{ALL, ParseSortError, PriceRange, ProductFilter, QueryResult, SortOrder};

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use despensa_core::{BrandId, CategoryId, Price, ProductId};

use crate::fixtures;
use crate::models::{Brand, Category, Product};

/// Products per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Errors that can occur when loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog JSON could not be parsed.
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two products share an ID.
    #[error("duplicate product id: {0}")]
    DuplicateProduct(ProductId),

    /// A product references a category that does not exist.
    #[error("product {product} references unknown category {category}")]
    UnknownCategory {
        product: ProductId,
        category: CategoryId,
    },

    /// A product references a brand that does not exist.
    #[error("product {product} references unknown brand {brand}")]
    UnknownBrand { product: ProductId, brand: BrandId },

    /// A product violates a numeric constraint.
    #[error("invalid product {id}: {reason}")]
    InvalidProduct { id: ProductId, reason: String },

    /// Products are priced in more than one currency.
    #[error("product {0} is priced in a different currency than the catalog")]
    MixedCurrency(ProductId),
}

/// Serialized catalog layout.
#[derive(Debug, Deserialize)]
struct CatalogData {
    categories: Vec<Category>,
    brands: Vec<Brand>,
    products: Vec<Product>,
}

/// A category together with how many products it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount<'a> {
    pub category: &'a Category,
    pub count: usize,
}

/// The read-only product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    brands: Vec<Brand>,
    products: Vec<Product>,
    page_size: usize,
}

impl Catalog {
    /// Build a catalog, validating references and product invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] for duplicate IDs, dangling category or
    /// brand references, invalid prices/discounts/ratings or mixed
    /// currencies.
    pub fn new(
        categories: Vec<Category>,
        brands: Vec<Brand>,
        products: Vec<Product>,
    ) -> Result<Self, CatalogError> {
        let category_ids: HashSet<&CategoryId> = categories.iter().map(|c| &c.id).collect();
        let brand_ids: HashSet<&BrandId> = brands.iter().map(|b| &b.id).collect();
        let mut seen: HashSet<&ProductId> = HashSet::new();
        let currency = products.first().map(|p| p.price.currency_code);

        for product in &products {
            if !seen.insert(&product.id) {
                return Err(CatalogError::DuplicateProduct(product.id.clone()));
            }
            if !category_ids.contains(&product.category) {
                return Err(CatalogError::UnknownCategory {
                    product: product.id.clone(),
                    category: product.category.clone(),
                });
            }
            if !brand_ids.contains(&product.brand) {
                return Err(CatalogError::UnknownBrand {
                    product: product.id.clone(),
                    brand: product.brand.clone(),
                });
            }
            product
                .validate()
                .map_err(|reason| CatalogError::InvalidProduct {
                    id: product.id.clone(),
                    reason,
                })?;
            if currency.is_some_and(|c| c != product.price.currency_code) {
                return Err(CatalogError::MixedCurrency(product.id.clone()));
            }
        }

        debug!(
            products = products.len(),
            categories = categories.len(),
            brands = brands.len(),
            "Catalog loaded"
        );

        Ok(Self {
            categories,
            brands,
            products,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Parse a catalog from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON, or any validation
    /// error from [`Catalog::new`].
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;
        Self::new(data.categories, data.brands, data.products)
    }

    /// The catalog bundled with the storefront.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled fixture fails validation.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(fixtures::CATALOG_JSON)
    }

    /// Use a different listing page size. Zero is treated as one.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    #[must_use]
    pub fn brand(&self, id: &BrandId) -> Option<&Brand> {
        self.brands.iter().find(|b| &b.id == id)
    }

    /// Run a listing query.
    ///
    /// `page` is 1-indexed; page 0 is read as page 1. A page past the end
    /// yields an empty item list, never an error.
    #[must_use]
    pub fn query(&self, filter: &ProductFilter, sort: SortOrder, page: usize) -> QueryResult<'_> {
        let mut matches: Vec<&Product> = self.products.iter().filter(|p| filter.matches(p)).collect();
        // sort_by is stable: equal keys keep catalog order
        matches.sort_by(|a, b| sort.compare(a, b));

        let page = page.max(1);
        let total_count = matches.len();
        let total_pages = total_count.div_ceil(self.page_size);
        let items = matches
            .into_iter()
            .skip((page - 1).saturating_mul(self.page_size))
            .take(self.page_size)
            .collect();

        QueryResult {
            items,
            total_count,
            page,
            page_size: self.page_size,
            total_pages,
        }
    }

    /// Featured products in catalog order.
    #[must_use]
    pub fn featured(&self, limit: usize) -> Vec<&Product> {
        self.products.iter().filter(|p| p.featured).take(limit).collect()
    }

    /// Other products from the same category, in catalog order.
    #[must_use]
    pub fn related(&self, id: &ProductId, limit: usize) -> Vec<&Product> {
        let Some(product) = self.get(id) else {
            return Vec::new();
        };
        self.products
            .iter()
            .filter(|p| p.category == product.category && p.id != product.id)
            .take(limit)
            .collect()
    }

    /// Lowest and highest unit price, for the price slider.
    #[must_use]
    pub fn price_bounds(&self) -> Option<PriceRange> {
        let min = self.products.iter().map(|p| p.price.amount).min()?;
        let max = self.products.iter().map(|p| p.price.amount).max()?;
        Some(PriceRange::new(min, max))
    }

    /// Categories with their product counts, in catalog order.
    #[must_use]
    pub fn categories_with_counts(&self) -> Vec<CategoryCount<'_>> {
        self.categories
            .iter()
            .map(|category| CategoryCount {
                category,
                count: self
                    .products
                    .iter()
                    .filter(|p| p.category == category.id)
                    .count(),
            })
            .collect()
    }

    /// Change a product's list price.
    ///
    /// Existing cart lines keep the price they were added at. Returns
    /// `false` if the product does not exist or the currency differs.
    pub fn update_price(&mut self, id: &ProductId, price: Price) -> bool {
        let Some(product) = self.products.iter_mut().find(|p| &p.id == id) else {
            return false;
        };
        if product.price.currency_code != price.currency_code || price.amount.is_sign_negative() {
            return false;
        }
        debug!(product = %id, old = %product.price, new = %price, "Catalog price updated");
        product.price = price;
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::bundled().unwrap()
    }

    fn ids(result: &QueryResult<'_>) -> Vec<String> {
        result.items.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 18);
        assert_eq!(catalog.categories().len(), 6);
        assert_eq!(catalog.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_default_query_pages() {
        let catalog = catalog();
        let first = catalog.query(&ProductFilter::default(), SortOrder::Featured, 1);
        assert_eq!(first.total_count, 18);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.items.len(), 12);
        assert!(first.has_next());

        let second = catalog.query(&ProductFilter::default(), SortOrder::Featured, 2);
        assert_eq!(second.items.len(), 6);
        assert!(!second.has_next());
        assert!(second.has_previous());
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let catalog = catalog();
        let result = catalog.query(&ProductFilter::default(), SortOrder::Name, 9);
        assert!(result.items.is_empty());
        assert_eq!(result.total_count, 18);
        assert_eq!(result.page, 9);
        assert!(result.has_previous());
        assert!(!result.has_next());
    }

    #[test]
    fn test_page_zero_reads_as_first_page() {
        let catalog = catalog();
        let zero = catalog.query(&ProductFilter::default(), SortOrder::Name, 0);
        let one = catalog.query(&ProductFilter::default(), SortOrder::Name, 1);
        assert_eq!(ids(&zero), ids(&one));
        assert_eq!(zero.page, 1);
    }

    #[test]
    fn test_category_filter_only_returns_category() {
        let catalog = catalog();
        let filter = ProductFilter::default().with_category("mar");
        let result = catalog.query(&filter, SortOrder::Featured, 1);

        assert_eq!(result.total_count, 6);
        assert!(result.items.iter().all(|p| p.category.as_str() == "mar"));
        // featured first, then catalog order among equals
        assert_eq!(
            ids(&result),
            vec![
                "gambas-rojas",
                "pulpo-cocido",
                "merluza-pincho",
                "mejillones-gallegos",
                "atun-rojo",
                "anchoas-santona",
            ]
        );
    }

    #[test]
    fn test_repeated_queries_are_identical() {
        let catalog = catalog();
        let filter = ProductFilter::default().with_category("mar");
        for sort in SortOrder::ALL {
            let a = catalog.query(&filter, sort, 1);
            let b = catalog.query(&filter, sort, 1);
            assert_eq!(ids(&a), ids(&b), "sort {sort} was not deterministic");
        }
    }

    #[test]
    fn test_search_matches_name_or_description_case_insensitive() {
        let catalog = catalog();
        let by_name = catalog.query(
            &ProductFilter::default().with_search("GAMBAS"),
            SortOrder::Featured,
            1,
        );
        assert_eq!(ids(&by_name), vec!["gambas-rojas"]);

        // "almadraba" only appears in the atún description
        let by_description = catalog.query(
            &ProductFilter::default().with_search("almadraba"),
            SortOrder::Featured,
            1,
        );
        assert_eq!(ids(&by_description), vec!["atun-rojo"]);
    }

    #[test]
    fn test_clauses_are_anded() {
        let catalog = catalog();
        let filter = ProductFilter::default()
            .with_category("mar")
            .discounted_only()
            .in_stock_only()
            .with_price_range(PriceRange::new(Decimal::from(25), Decimal::from(40)));
        let result = catalog.query(&filter, SortOrder::Featured, 1);
        assert_eq!(ids(&result), vec!["pulpo-cocido"]);
    }

    #[test]
    fn test_brand_and_flags() {
        let catalog = catalog();
        let in_stock = catalog.query(
            &ProductFilter::default().in_stock_only(),
            SortOrder::Featured,
            1,
        );
        assert_eq!(in_stock.total_count, 16);

        let featured = catalog.query(
            &ProductFilter::default().featured_only(),
            SortOrder::Featured,
            1,
        );
        assert_eq!(featured.total_count, 6);

        let brand = catalog.query(
            &ProductFilter::default().with_brand("quesos-sierra"),
            SortOrder::Featured,
            1,
        );
        assert_eq!(brand.total_count, 2);
    }

    #[test]
    fn test_price_sorts() {
        let catalog = catalog();
        let filter = ProductFilter::default().with_category("mar");

        let asc = catalog.query(&filter, SortOrder::PriceAsc, 1);
        assert_eq!(ids(&asc).first().unwrap(), "mejillones-gallegos");
        assert!(asc.items.windows(2).all(|w| w[0].price.amount <= w[1].price.amount));

        let desc = catalog.query(&filter, SortOrder::PriceDesc, 1);
        assert_eq!(ids(&desc).first().unwrap(), "atun-rojo");
        assert!(desc.items.windows(2).all(|w| w[0].price.amount >= w[1].price.amount));
    }

    #[test]
    fn test_discount_sort_treats_missing_as_zero() {
        let catalog = catalog();
        let result = catalog.query(&ProductFilter::default(), SortOrder::Discount, 1);
        let top: Vec<String> = ids(&result).into_iter().take(3).collect();
        assert_eq!(top, vec!["naranjas-valencia", "gambas-rojas", "aceite-oliva"]);
        assert_eq!(result.items.last().unwrap().discount_percent(), 0);
    }

    #[test]
    fn test_name_sort_uses_spanish_collation() {
        let catalog = catalog().with_page_size(50);
        let result = catalog.query(&ProductFilter::default(), SortOrder::Name, 1);
        let names: Vec<&str> = result.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"Aceite de oliva virgen extra"));
        assert_eq!(names.get(3), Some(&"Atún rojo en lomos"));
        // Ñoras lands after Naranjas and before Pollo
        let naranjas = names.iter().position(|n| *n == "Naranjas de Valencia").unwrap();
        let noras = names.iter().position(|n| *n == "Ñoras secas").unwrap();
        let pollo = names.iter().position(|n| *n == "Pollo de corral entero").unwrap();
        assert!(naranjas < noras && noras < pollo);
    }

    #[test]
    fn test_related_and_featured() {
        let catalog = catalog();
        let related = catalog.related(&ProductId::from("queso-manchego"), 4);
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].id.as_str(), "yogur-oveja");

        assert!(catalog.related(&ProductId::from("missing"), 4).is_empty());
        assert_eq!(catalog.featured(3).len(), 3);
    }

    #[test]
    fn test_price_bounds_and_counts() {
        let catalog = catalog();
        let bounds = catalog.price_bounds().unwrap();
        assert_eq!(bounds.min, Decimal::new(199, 2));
        assert_eq!(bounds.max, Decimal::new(3990, 2));

        let counts = catalog.categories_with_counts();
        let mar = counts.iter().find(|c| c.category.id.as_str() == "mar").unwrap();
        assert_eq!(mar.count, 6);
    }

    #[test]
    fn test_validation_errors() {
        let json = fixtures::CATALOG_JSON;
        let mut data: serde_json::Value = serde_json::from_str(json).unwrap();
        data["products"][1]["id"] = serde_json::Value::String("gambas-rojas".into());
        let err = Catalog::from_json(&data.to_string()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateProduct(_)));

        let mut data: serde_json::Value = serde_json::from_str(json).unwrap();
        data["products"][0]["category"] = serde_json::Value::String("joyeria".into());
        let err = Catalog::from_json(&data.to_string()).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownCategory { .. }));

        let mut data: serde_json::Value = serde_json::from_str(json).unwrap();
        data["products"][0]["discount"] = serde_json::json!(150);
        let err = Catalog::from_json(&data.to_string()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidProduct { .. }));

        assert!(matches!(
            Catalog::from_json("{"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_update_price() {
        let mut catalog = catalog();
        let id = ProductId::from("tomate-rama");
        assert!(catalog.update_price(&id, Price::from_cents(299)));
        assert_eq!(catalog.get(&id).unwrap().price, Price::from_cents(299));
        assert!(!catalog.update_price(&ProductId::from("missing"), Price::from_cents(1)));
    }
}
