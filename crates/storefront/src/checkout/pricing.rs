//! Order pricing.
//!
//! [`summarize`] is the single pricing function. The cart drawer, the
//! checkout steps and order placement all call it, so the totals a shopper
//! sees are always the totals that get charged.
//!
//! Order of operations:
//!
//! ```text
//! subtotal = cart total at snapshot prices
//! discount = promo applied ? subtotal × 10% : 0
//! shipping = subtotal > 50 ? 0 : 5.99        (pre-discount subtotal)
//! tax      = (subtotal − discount) × 21%     (after discount)
//! total    = subtotal − discount + shipping + tax
//! ```
//!
//! Discount and tax are rounded to cents (midpoint away from zero) and the
//! total is the sum of the rounded parts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use despensa_core::Price;
use despensa_core::types::price::round_cents;

/// The one promo code the storefront accepts (case-insensitive).
pub const PROMO_CODE: &str = "DESCUENTO10";

/// Promo discount rate: 10%.
pub const PROMO_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Subtotals strictly above this ship free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Flat shipping fee below the threshold.
pub const SHIPPING_FEE: Decimal = Decimal::from_parts(599, 0, 0, false, 2);

/// VAT rate: 21%.
pub const TAX_RATE: Decimal = Decimal::from_parts(21, 0, 0, false, 2);

/// Every amount shown on the order summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub subtotal: Price,
    pub discount: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

impl PriceSummary {
    /// Whether shipping is waived.
    #[must_use]
    pub fn free_shipping(&self) -> bool {
        self.shipping.amount.is_zero()
    }

    /// How much more the shopper must add to get free shipping.
    ///
    /// `None` once shipping is already free.
    #[must_use]
    pub fn remaining_for_free_shipping(&self) -> Option<Price> {
        (!self.free_shipping()).then(|| {
            let gap = (FREE_SHIPPING_THRESHOLD - self.subtotal.amount).max(Decimal::ZERO);
            // strictly-greater threshold: one cent more than the gap
            Price::new(gap + Decimal::new(1, 2), self.subtotal.currency_code)
        })
    }
}

/// Compute the order summary for a cart subtotal.
#[must_use]
pub fn summarize(subtotal: Price, promo_applied: bool) -> PriceSummary {
    let currency = subtotal.currency_code;
    let subtotal_amount = subtotal.amount;

    let discount = if promo_applied {
        round_cents(subtotal_amount * PROMO_RATE)
    } else {
        Decimal::ZERO
    };
    let shipping = if subtotal_amount > FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        SHIPPING_FEE
    };
    let tax = round_cents((subtotal_amount - discount) * TAX_RATE);
    let total = subtotal_amount - discount + shipping + tax;

    PriceSummary {
        subtotal,
        discount: Price::new(discount, currency),
        shipping: Price::new(shipping, currency),
        tax: Price::new(tax, currency),
        total: Price::new(total, currency),
    }
}

/// Whether `code` is the accepted promo code.
#[must_use]
pub fn promo_matches(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case(PROMO_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eur(cents: i64) -> Price {
        Price::from_cents(cents)
    }

    #[test]
    fn test_small_order_without_promo() {
        let summary = summarize(eur(4000), false);
        assert_eq!(summary.discount, eur(0));
        assert_eq!(summary.shipping, eur(599));
        assert_eq!(summary.tax, eur(840));
        assert_eq!(summary.total, eur(5439));
    }

    #[test]
    fn test_large_order_with_promo() {
        let summary = summarize(eur(6000), true);
        assert_eq!(summary.discount, eur(600));
        assert_eq!(summary.shipping, eur(0));
        assert_eq!(summary.tax, eur(1134));
        assert_eq!(summary.total, eur(6534));
    }

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(summarize(eur(5000), false).shipping, eur(599));
        assert_eq!(summarize(eur(5001), false).shipping, eur(0));
    }

    #[test]
    fn test_shipping_uses_pre_discount_subtotal() {
        // 55 - 10% = 49.50, still ships free because shipping looks at 55
        let summary = summarize(eur(5500), true);
        assert!(summary.free_shipping());
        assert_eq!(summary.discount, eur(550));
        assert_eq!(summary.tax, eur(1040));
        assert_eq!(summary.total, eur(5990));
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        // 12.95 × 0.21 = 2.7195 → 2.72
        let summary = summarize(eur(1295), false);
        assert_eq!(summary.tax, eur(272));
        assert_eq!(summary.total, eur(1295 + 599 + 272));
    }

    #[test]
    fn test_remaining_for_free_shipping() {
        assert_eq!(
            summarize(eur(4000), false).remaining_for_free_shipping(),
            Some(eur(1001))
        );
        assert_eq!(summarize(eur(6000), false).remaining_for_free_shipping(), None);
    }

    #[test]
    fn test_promo_matches() {
        assert!(promo_matches("DESCUENTO10"));
        assert!(promo_matches(" descuento10 "));
        assert!(!promo_matches("DESCUENTO20"));
        assert!(!promo_matches(""));
    }
}
