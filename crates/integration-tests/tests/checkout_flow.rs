//! Integration tests for the checkout pipeline.
//!
//! Drives cart, auth, checkout and the simulated services together through
//! the public API, the way the CLI does.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use despensa_core::{AddressId, OrderStatus, PaymentMethodId, Price};
use despensa_integration_tests::TestContext;
use despensa_storefront::AppError;
use despensa_storefront::cancel::{CancelHandle, CancelToken};
use despensa_storefront::cart::CartStore;
use despensa_storefront::checkout::{
    CheckoutSession, CheckoutStep, GuardError, PlaceOrderError, TransitionError,
};
use despensa_storefront::error::GENERIC_MESSAGE;
use despensa_storefront::fixtures::{DEMO_EMAIL, DEMO_PASSWORD};
use despensa_storefront::services::payment::{
    PaymentError, RetryPolicy, SimulatedGateway, SimulatedOutcome,
};
use despensa_storefront::session::ShopperSession;

fn policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_backoff: Duration::from_millis(200),
        max_backoff: Duration::from_secs(2),
        attempt_timeout: Duration::from_secs(10),
    }
}

/// 2 × gambas (24.90) + 3 × tomate (2.49) = 57.27
fn filled_cart(ctx: &TestContext) -> CartStore {
    let mut cart = CartStore::new();
    cart.add_item(ctx.product("gambas-rojas").unwrap(), 2);
    cart.add_item(ctx.product("tomate-rama").unwrap(), 3);
    cart
}

/// Advance to the payment step with everything selected.
fn at_payment(ctx: &TestContext, cart: &CartStore) -> CheckoutSession {
    let mut checkout = ctx.state.start_checkout(None);
    assert_eq!(checkout.next(cart).unwrap(), CheckoutStep::Shipping);
    checkout
        .select_address(&AddressId::from("addr-restaurante"))
        .unwrap();
    assert_eq!(checkout.next(cart).unwrap(), CheckoutStep::Payment);
    checkout
        .select_payment(&PaymentMethodId::from("pm-visa"))
        .unwrap();
    checkout.set_terms(true);
    checkout
}

// ============================================================================
// Happy Path
// ============================================================================

#[tokio::test]
async fn test_logged_in_checkout_with_promo() {
    let ctx = TestContext::new().unwrap();
    let mut session = ShopperSession::new();
    assert!(
        session
            .auth
            .login(
                ctx.state.directory(),
                DEMO_EMAIL,
                DEMO_PASSWORD,
                &CancelToken::never()
            )
            .await
            .unwrap()
    );
    session.cart = filled_cart(&ctx);

    let mut checkout = ctx.state.start_checkout(session.auth.user());
    checkout
        .apply_promo(ctx.state.promo(), " descuento10 ", &CancelToken::never())
        .await
        .unwrap();
    assert_eq!(checkout.promo().code, "DESCUENTO10");

    checkout.next(&session.cart).unwrap();
    checkout
        .select_address(&AddressId::from("addr-restaurante"))
        .unwrap();
    checkout.next(&session.cart).unwrap();
    checkout
        .select_payment(&PaymentMethodId::from("pm-visa"))
        .unwrap();
    checkout.set_terms(true);

    let summary = checkout.summary(&session.cart);
    assert_eq!(summary.subtotal, Price::from_cents(5727));
    assert_eq!(summary.discount, Price::from_cents(573));
    assert!(summary.free_shipping());
    assert_eq!(summary.tax, Price::from_cents(1082));
    assert_eq!(summary.total, Price::from_cents(6236));

    let confirmation = checkout
        .place_order(
            &mut session.cart,
            ctx.state.gateway(),
            &policy(),
            &CancelToken::never(),
        )
        .await
        .unwrap();

    assert!(session.cart.is_empty());
    assert_eq!(checkout.step(), CheckoutStep::Confirmation);
    assert_eq!(confirmation.summary, summary);
    assert_eq!(confirmation.order.status, OrderStatus::Processing);
    assert!(confirmation.order.id.as_str().starts_with("ORD-"));
    assert_eq!(confirmation.receipt.amount, summary.total.round_cents());

    session.remember_order(&confirmation);
    assert_eq!(session.placed_orders.len(), 1);
    assert_eq!(
        session.placed_orders.first().unwrap().customer.as_str(),
        DEMO_EMAIL
    );
}

#[tokio::test]
async fn test_guest_checkout_totals() {
    let ctx = TestContext::new().unwrap();
    let mut cart = filled_cart(&ctx);
    let mut checkout = at_payment(&ctx, &cart);

    let confirmation = checkout
        .place_order(
            &mut cart,
            ctx.state.gateway(),
            &policy(),
            &CancelToken::never(),
        )
        .await
        .unwrap();

    // 57.27 ships free; 21% VAT on 57.27 is 12.03
    assert_eq!(confirmation.summary.total, Price::from_cents(6930));
    assert_eq!(confirmation.receipt.amount, Price::from_cents(6930));
    assert_eq!(confirmation.order.item_count(), 5);
    assert_eq!(confirmation.order.items.len(), 2);
}

// ============================================================================
// Guards and Navigation
// ============================================================================

#[tokio::test]
async fn test_guards_block_each_step() {
    let ctx = TestContext::new().unwrap();
    let empty = CartStore::new();
    let mut checkout = ctx.state.start_checkout(None);

    let err = checkout.next(&empty).unwrap_err();
    assert_eq!(err, TransitionError::Guard(GuardError::EmptyCart));
    assert_eq!(checkout.step(), CheckoutStep::Cart);

    let cart = filled_cart(&ctx);
    checkout.next(&cart).unwrap();
    assert_eq!(
        checkout.next(&cart).unwrap_err(),
        TransitionError::Guard(GuardError::NoAddress)
    );

    checkout
        .select_address(&AddressId::from("addr-restaurante"))
        .unwrap();
    checkout.next(&cart).unwrap();
    assert_eq!(
        checkout.next(&cart).unwrap_err(),
        TransitionError::Guard(GuardError::NoPayment)
    );

    checkout
        .select_payment(&PaymentMethodId::from("pm-visa"))
        .unwrap();
    assert_eq!(
        checkout.next(&cart).unwrap_err(),
        TransitionError::Guard(GuardError::TermsNotAccepted)
    );

    checkout.set_terms(true);
    assert_eq!(
        checkout.next(&cart).unwrap_err(),
        TransitionError::AwaitingPayment
    );
    assert_eq!(checkout.step(), CheckoutStep::Payment);

    let message = AppError::from(GuardError::TermsNotAccepted).user_message();
    assert_eq!(message, GuardError::TermsNotAccepted.to_string());
}

#[tokio::test]
async fn test_back_navigation_keeps_selections() {
    let ctx = TestContext::new().unwrap();
    let cart = filled_cart(&ctx);
    let mut checkout = at_payment(&ctx, &cart);

    assert_eq!(checkout.go_to(CheckoutStep::Cart).unwrap(), CheckoutStep::Cart);
    assert_eq!(
        checkout.go_to(CheckoutStep::Payment).unwrap_err(),
        TransitionError::NotVisited(CheckoutStep::Payment)
    );

    checkout.next(&cart).unwrap();
    checkout.next(&cart).unwrap();
    assert_eq!(checkout.step(), CheckoutStep::Payment);
    assert!(checkout.selected_address().is_some());
    assert!(checkout.selected_payment().is_some());
    assert!(checkout.agree_to_terms());
}

#[tokio::test]
async fn test_cart_emptied_after_reaching_payment() {
    let ctx = TestContext::new().unwrap();
    let mut cart = filled_cart(&ctx);
    let mut checkout = at_payment(&ctx, &cart);
    cart.clear();

    let err = checkout
        .place_order(
            &mut cart,
            ctx.state.gateway(),
            &policy(),
            &CancelToken::never(),
        )
        .await
        .unwrap_err();
    assert_eq!(err, PlaceOrderError::Guard(GuardError::EmptyCart));
    assert_eq!(ctx.state.gateway().attempts(), 0);
}

// ============================================================================
// Payment Failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_transient_failures_are_retried() {
    let ctx = TestContext::new().unwrap();
    let mut cart = filled_cart(&ctx);
    let mut checkout = at_payment(&ctx, &cart);
    let gateway = SimulatedGateway::new(Duration::from_millis(1500)).with_script([
        SimulatedOutcome::Fail(PaymentError::Network("connection reset".to_string())),
        SimulatedOutcome::Stall,
    ]);

    checkout
        .place_order(&mut cart, &gateway, &policy(), &CancelToken::never())
        .await
        .unwrap();

    assert_eq!(gateway.attempts(), 3);
    assert!(cart.is_empty());
    assert_eq!(checkout.step(), CheckoutStep::Confirmation);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_keep_cart() {
    let ctx = TestContext::new().unwrap();
    let mut cart = filled_cart(&ctx);
    let before = cart.clone();
    let mut checkout = at_payment(&ctx, &cart);
    let gateway = SimulatedGateway::new(Duration::ZERO).with_script(std::iter::repeat_n(
        SimulatedOutcome::Fail(PaymentError::Unavailable),
        3,
    ));

    let err = checkout
        .place_order(&mut cart, &gateway, &policy(), &CancelToken::never())
        .await
        .unwrap_err();

    assert_eq!(err, PlaceOrderError::Payment(PaymentError::Unavailable));
    assert_eq!(gateway.attempts(), 3);
    assert_eq!(cart, before);
    assert_eq!(checkout.step(), CheckoutStep::Payment);

    let app_error = AppError::from(err);
    assert!(app_error.is_transient());
    assert_eq!(app_error.user_message(), GENERIC_MESSAGE);

    // The shopper can try again once the processor recovers.
    checkout
        .place_order(&mut cart, &gateway, &policy(), &CancelToken::never())
        .await
        .unwrap();
    assert!(cart.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_declined_is_not_retried() {
    let ctx = TestContext::new().unwrap();
    let mut cart = filled_cart(&ctx);
    let mut checkout = at_payment(&ctx, &cart);
    let gateway = SimulatedGateway::new(Duration::ZERO).with_script([SimulatedOutcome::Fail(
        PaymentError::Declined("insufficient funds".to_string()),
    )]);

    let err = checkout
        .place_order(&mut cart, &gateway, &policy(), &CancelToken::never())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PlaceOrderError::Payment(PaymentError::Declined(_))
    ));
    assert_eq!(gateway.attempts(), 1);
    assert_eq!(cart.total_items(), 5);
    let message = AppError::from(err).user_message();
    assert!(message.contains("declined"));
    assert!(!message.contains("insufficient"));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_payment() {
    let ctx = TestContext::new().unwrap();
    let mut cart = filled_cart(&ctx);
    let mut checkout = at_payment(&ctx, &cart);
    let gateway = SimulatedGateway::new(Duration::from_millis(1500));
    let handle = CancelHandle::new();
    let token = handle.token();
    let policy = policy();

    let (result, ()) = tokio::join!(
        checkout.place_order(&mut cart, &gateway, &policy, &token),
        async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            handle.cancel();
        }
    );

    assert_eq!(result.unwrap_err(), PlaceOrderError::Payment(PaymentError::Cancelled));
    assert_eq!(cart.total_items(), 5);
    assert_eq!(checkout.step(), CheckoutStep::Payment);
    assert!(checkout.confirmation().is_none());
}
