//! Catalog browsing commands.

use rust_decimal::Decimal;

use despensa_core::ProductId;
use despensa_storefront::AppError;
use despensa_storefront::catalog::{PriceRange, ProductFilter, SortOrder};
use despensa_storefront::models::Product;

use super::Shop;

/// Related products shown under a product detail.
const RELATED_LIMIT: usize = 4;

/// Listing options from the command line.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub search: String,
    pub category: String,
    pub brand: String,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub discounted_only: bool,
    pub in_stock_only: bool,
    pub featured_only: bool,
    pub sort: SortOrder,
    pub page: usize,
}

impl Listing {
    /// The catalog filter. A single price bound is completed with the
    /// catalog's own bound on the other side.
    fn filter(&self, shop: &Shop) -> ProductFilter {
        let mut filter = ProductFilter::default()
            .with_search(&self.search)
            .with_category(&self.category)
            .with_brand(&self.brand);

        if self.min_price.is_some() || self.max_price.is_some() {
            let bounds = shop.state.catalog().price_bounds();
            let min = self
                .min_price
                .or_else(|| bounds.map(|b| b.min))
                .unwrap_or(Decimal::ZERO);
            let max = self
                .max_price
                .or_else(|| bounds.map(|b| b.max))
                .unwrap_or(Decimal::MAX);
            filter = filter.with_price_range(PriceRange::new(min, max));
        }
        if self.discounted_only {
            filter = filter.discounted_only();
        }
        if self.in_stock_only {
            filter = filter.in_stock_only();
        }
        if self.featured_only {
            filter = filter.featured_only();
        }
        filter
    }
}

/// One catalog page.
#[must_use]
pub fn list(shop: &Shop, listing: &Listing) -> String {
    let catalog = shop.state.catalog();
    let result = catalog.query(&listing.filter(shop), listing.sort, listing.page);

    if result.total_count == 0 {
        return "No products match these filters.".to_string();
    }

    let mut lines: Vec<String> = result
        .items
        .iter()
        .map(|product| product_line(shop, product))
        .collect();
    if result.items.is_empty() {
        lines.push(format!("Page {} is past the last page.", result.page));
    }
    lines.push(String::new());
    lines.push(format!(
        "{} products, page {} of {} (sorted by {})",
        result.total_count, result.page, result.total_pages, listing.sort
    ));
    if result.has_next() {
        lines.push(format!("Next page: --page {}", result.page + 1));
    }
    lines.join("\n")
}

/// Categories with product counts.
#[must_use]
pub fn categories(shop: &Shop) -> String {
    shop.state
        .catalog()
        .categories_with_counts()
        .iter()
        .map(|entry| {
            format!(
                "{:<12} {} ({})",
                entry.category.id, entry.category.name, entry.count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Product detail with related products.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown product.
pub fn product(shop: &Shop, id: &str) -> Result<String, AppError> {
    let catalog = shop.state.catalog();
    let product = shop.product(id)?;

    let mut lines = vec![
        product.name.clone(),
        format!("  {}", price_label(product)),
        format!(
            "  {}",
            if product.in_stock { "In stock" } else { "Out of stock" }
        ),
    ];
    if let Some(brand) = catalog.brand(&product.brand) {
        lines.push(format!("  Brand: {}", brand.name));
    }
    if let Some(category) = catalog.category(&product.category) {
        lines.push(format!("  Category: {}", category.name));
    }
    if let Some(rating) = product.rating {
        lines.push(format!(
            "  Rating: {rating:.1} ({} reviews)",
            product.review_count.unwrap_or(0)
        ));
    }
    if shop.session.favorites.is_favorite(&product.id) {
        lines.push("  ♥ In your favorites".to_string());
    }
    lines.push(String::new());
    lines.push(product.description.clone());

    for (label, value) in [
        ("Origin", &product.origin),
        ("Weight", &product.weight),
        ("Preparation", &product.preparation),
        ("Storage", &product.storage),
        ("Ingredients", &product.ingredients),
    ] {
        if let Some(value) = value {
            lines.push(format!("{label}: {value}"));
        }
    }
    if !product.allergens.is_empty() {
        lines.push(format!("Allergens: {}", product.allergens.join(", ")));
    }

    let related = catalog.related(&ProductId::from(id), RELATED_LIMIT);
    if !related.is_empty() {
        lines.push(String::new());
        lines.push("Related:".to_string());
        lines.extend(related.iter().map(|p| format!("  {}", product_line(shop, p))));
    }
    Ok(lines.join("\n"))
}

fn price_label(product: &Product) -> String {
    match product.original_price {
        Some(original) if product.is_discounted() => format!(
            "{} / {} (was {}, -{}%)",
            product.price,
            product.units,
            original,
            product.discount_percent()
        ),
        _ => format!("{} / {}", product.price, product.units),
    }
}

fn product_line(shop: &Shop, product: &Product) -> String {
    let favorite = if shop.session.favorites.is_favorite(&product.id) {
        "♥"
    } else {
        " "
    };
    let stock = if product.in_stock { "" } else { " [out of stock]" };
    format!(
        "{favorite} {:<22} {:<32} {}{stock}",
        product.id,
        product.name,
        price_label(product)
    )
}
