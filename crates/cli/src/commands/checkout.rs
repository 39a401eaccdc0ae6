//! Non-interactive checkout.
//!
//! Walks the four checkout steps in one go: the cart is checked, the address
//! and payment method are selected, the terms flag is set and the order is
//! placed. The first unmet guard stops the run with its prompt.

use tracing::error;

use despensa_core::{AddressId, PaymentMethodId};
use despensa_storefront::AppError;
use despensa_storefront::cancel::CancelToken;
use despensa_storefront::checkout::PriceSummary;

use super::Shop;

/// Checkout choices from the command line.
#[derive(Debug, Clone, Default)]
pub struct CheckoutRequest {
    pub address: Option<String>,
    pub payment: Option<String>,
    pub promo: Option<String>,
    pub accept_terms: bool,
}

/// Saved addresses, payment methods and the current order summary.
///
/// # Errors
///
/// Returns the promo error when a given code does not apply.
pub async fn options(
    shop: &Shop,
    request: &CheckoutRequest,
    cancel: &CancelToken,
) -> Result<String, AppError> {
    let mut checkout = shop.state.start_checkout(shop.session.auth.user());
    if let Some(code) = &request.promo {
        checkout.apply_promo(shop.state.promo(), code, cancel).await?;
    }

    let options = checkout.options();
    let mut lines = vec!["Addresses:".to_string()];
    lines.extend(options.addresses.iter().map(|address| {
        let default = if address.is_default { " (default)" } else { "" };
        format!("  {:<20} {address}{default}", address.id)
    }));
    lines.push("Payment methods:".to_string());
    lines.extend(options.payment_methods.iter().map(|method| {
        let default = if method.is_default { " (default)" } else { "" };
        format!("  {:<20} {method}{default}", method.id)
    }));
    lines.push(String::new());
    lines.extend(summary_lines(&checkout.summary(&shop.session.cart)));
    Ok(lines.join("\n"))
}

/// Run every step, place the order and save the shopper state.
///
/// Once the charge has gone through the order is always reported, even if
/// the emptied cart cannot be saved.
///
/// # Errors
///
/// Returns the first unmet guard, an unknown selection, a promo error, or
/// the payment failure. The cart is untouched on any error.
pub async fn run(
    shop: &mut Shop,
    request: &CheckoutRequest,
    cancel: &CancelToken,
) -> Result<String, AppError> {
    let state = shop.state.clone();
    let mut checkout = state.start_checkout(shop.session.auth.user());

    if let Some(code) = &request.promo {
        checkout.apply_promo(state.promo(), code, cancel).await?;
    }

    checkout.next(&shop.session.cart)?;
    if let Some(address) = &request.address {
        checkout.select_address(&AddressId::from(address.as_str()))?;
    }
    checkout.next(&shop.session.cart)?;
    if let Some(payment) = &request.payment {
        checkout.select_payment(&PaymentMethodId::from(payment.as_str()))?;
    }
    checkout.set_terms(request.accept_terms);

    let confirmation = checkout
        .place_order(
            &mut shop.session.cart,
            state.gateway(),
            &state.config().payment_retry,
            cancel,
        )
        .await?;
    shop.session.remember_order(&confirmation);

    let order = &confirmation.order;
    let mut lines = vec![
        format!("Order {} placed.", order.id),
        format!("Transaction: {}", confirmation.receipt.transaction_id),
    ];
    if let Err(e) = shop.save() {
        error!(order = %order.id, error = %e, "order placed but shopper state not saved");
        lines.push(format!(
            "Warning: your cart could not be saved. Order {} is paid; do not place it again.",
            order.id
        ));
    }
    if let Some(address) = &order.shipping_address {
        lines.push(format!("Ship to: {address}"));
    }
    if let Some(method) = &order.payment_method {
        lines.push(format!("Paid with: {method}"));
    }
    lines.push(String::new());
    lines.extend(
        order
            .items
            .iter()
            .map(|item| format!("{:>3} × {:<32} {}", item.quantity, item.name, item.line_total())),
    );
    lines.push(String::new());
    lines.extend(summary_lines(&confirmation.summary));
    if !shop.session.auth.is_authenticated() {
        lines.push(String::new());
        lines.push("Log in to keep this order in your account history.".to_string());
    }
    Ok(lines.join("\n"))
}

fn summary_lines(summary: &PriceSummary) -> Vec<String> {
    let mut lines = vec![format!("Subtotal: {}", summary.subtotal)];
    if !summary.discount.is_zero() {
        lines.push(format!("Discount: -{}", summary.discount));
    }
    lines.push(format!(
        "Shipping: {}",
        if summary.free_shipping() {
            "free".to_string()
        } else {
            summary.shipping.to_string()
        }
    ));
    lines.push(format!("VAT:      {}", summary.tax));
    lines.push(format!("Total:    {}", summary.total));
    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use despensa_storefront::checkout::GuardError;
    use despensa_storefront::fixtures::{DEMO_EMAIL, DEMO_PASSWORD};
    use despensa_storefront::storage::{FileStore, Storage};

    use super::*;
    use crate::commands::{account, cart, testing};

    fn full_request() -> CheckoutRequest {
        CheckoutRequest {
            address: Some("addr-restaurante".to_string()),
            payment: Some("pm-visa".to_string()),
            promo: None,
            accept_terms: true,
        }
    }

    #[tokio::test]
    async fn test_checkout_places_order_and_records_history() {
        let mut shop = testing::shop();
        account::login(&mut shop, DEMO_EMAIL, DEMO_PASSWORD, &CancelToken::never())
            .await
            .unwrap();
        cart::add(&mut shop, "gambas-rojas", 2).unwrap();
        cart::add(&mut shop, "tomate-rama", 3).unwrap();

        let output = run(&mut shop, &full_request(), &CancelToken::never())
            .await
            .unwrap();

        assert!(output.contains("69.30"));
        assert!(shop.session.cart.is_empty());
        assert_eq!(shop.session.placed_orders.len(), 1);

        let orders = account::orders(&shop, None, "").unwrap();
        assert_eq!(orders.lines().count(), 7);
        testing::cleanup(&shop);
    }

    #[tokio::test]
    async fn test_missing_terms_stops_before_payment() {
        let mut shop = testing::shop();
        cart::add(&mut shop, "atun-rojo", 1).unwrap();

        let err = run(
            &mut shop,
            &CheckoutRequest {
                accept_terms: false,
                ..full_request()
            },
            &CancelToken::never(),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.user_message(),
            GuardError::TermsNotAccepted.to_string()
        );
        assert_eq!(shop.session.cart.total_items(), 1);
        testing::cleanup(&shop);
    }

    #[tokio::test]
    async fn test_empty_cart_is_refused() {
        let mut shop = testing::shop();
        let err = run(&mut shop, &full_request(), &CancelToken::never())
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), GuardError::EmptyCart.to_string());
        testing::cleanup(&shop);
    }

    #[tokio::test]
    async fn test_order_reported_when_save_fails() {
        let mut shop = testing::shop();
        cart::add(&mut shop, "atun-rojo", 1).unwrap();
        let blocked = shop.state.config().storage_dir.with_extension("blocked");
        std::fs::write(&blocked, "not a directory").unwrap();
        shop.storage = Storage::new(FileStore::new(&blocked), "despensa");

        let output = run(&mut shop, &full_request(), &CancelToken::never())
            .await
            .unwrap();

        assert!(output.contains("placed."));
        assert!(output.contains("do not place it again"));
        assert!(shop.session.cart.is_empty());
        std::fs::remove_file(&blocked).ok();
        testing::cleanup(&shop);
    }

    #[tokio::test]
    async fn test_checkout_saves_emptied_cart() {
        let mut shop = testing::shop();
        cart::add(&mut shop, "atun-rojo", 1).unwrap();
        shop.save().unwrap();

        run(&mut shop, &full_request(), &CancelToken::never())
            .await
            .unwrap();

        let reopened = Shop::open(shop.state.config().clone()).unwrap();
        assert!(reopened.session.cart.is_empty());
        testing::cleanup(&shop);
    }

    #[tokio::test]
    async fn test_promo_shown_in_options() {
        let mut shop = testing::shop();
        cart::add(&mut shop, "chuleton-vaca", 2).unwrap();
        let request = CheckoutRequest {
            promo: Some("descuento10".to_string()),
            ..CheckoutRequest::default()
        };

        let output = options(&shop, &request, &CancelToken::never())
            .await
            .unwrap();
        assert!(output.contains("Discount:"));
        assert!(output.contains("addr-restaurante"));
        testing::cleanup(&shop);
    }
}
