//! Integration tests for the account dashboard projection.

#![allow(clippy::unwrap_used)]

use despensa_core::{AddressId, Email, OrderStatus, PaymentMethodId, Price};
use despensa_integration_tests::TestContext;
use despensa_storefront::cancel::CancelToken;
use despensa_storefront::fixtures::{DEMO_EMAIL, DEMO_PASSWORD, SECOND_EMAIL};
use despensa_storefront::session::ShopperSession;

async fn logged_in(ctx: &TestContext) -> ShopperSession {
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
    session
}

#[tokio::test]
async fn test_sample_history_stats() {
    let ctx = TestContext::new().unwrap();
    let session = logged_in(&ctx).await;
    let history = session
        .order_book(ctx.state.order_book())
        .for_user(session.auth.user().unwrap());

    let stats = history.stats();
    assert_eq!(stats.total_orders, 6);
    assert_eq!(stats.total_spent, Price::from_cents(60265));
    assert_eq!(stats.open_orders, 3);
    assert_eq!(stats.pending_invoices_amount, Price::from_cents(32116));
    assert_eq!(stats.count(OrderStatus::Cancelled), 1);
}

#[tokio::test]
async fn test_placed_order_reaches_dashboard() {
    let ctx = TestContext::new().unwrap();
    let mut session = logged_in(&ctx).await;
    // 4 × 9.80 = 39.20, ships at 5.99, VAT 8.23 → 53.42
    session.cart.add_item(ctx.product("pollo-corral").unwrap(), 4);

    let mut checkout = ctx.state.start_checkout(session.auth.user());
    checkout.next(&session.cart).unwrap();
    checkout
        .select_address(&AddressId::from("addr-restaurante"))
        .unwrap();
    checkout.next(&session.cart).unwrap();
    checkout
        .select_payment(&PaymentMethodId::from("pm-visa"))
        .unwrap();
    checkout.set_terms(true);
    let confirmation = checkout
        .place_order(
            &mut session.cart,
            ctx.state.gateway(),
            &ctx.state.config().payment_retry,
            &CancelToken::never(),
        )
        .await
        .unwrap();
    assert_eq!(confirmation.order.total, Price::from_cents(5342));
    session.remember_order(&confirmation);

    let book = session.order_book(ctx.state.order_book());
    let history = book.for_user(session.auth.user().unwrap());
    let stats = history.stats();

    assert_eq!(stats.total_orders, 7);
    assert_eq!(stats.total_spent, Price::from_cents(60265 + 5342));
    assert_eq!(stats.open_orders, 4);
    assert_eq!(stats.count(OrderStatus::Processing), 2);
    assert_eq!(
        stats.pending_invoices_amount,
        Price::from_cents(32116 + 5342)
    );

    let newest = history.recent_orders(1);
    assert_eq!(newest.first().unwrap().id, confirmation.order.id);

    let found = history.filter_orders(None, "pollo");
    assert_eq!(found.len(), 1);
    let invoices = history.filter_invoices(Some(OrderStatus::Pending), "pollo");
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices.first().unwrap().order_id, confirmation.order.id);
}

#[tokio::test]
async fn test_history_is_per_customer() {
    let ctx = TestContext::new().unwrap();
    let session = logged_in(&ctx).await;
    let book = session.order_book(ctx.state.order_book());

    let demo = book.for_email(&Email::parse(DEMO_EMAIL).unwrap());
    let second = book.for_email(&Email::parse(SECOND_EMAIL).unwrap());
    assert!(
        demo.orders
            .iter()
            .all(|order| second.orders.iter().all(|other| other.id != order.id))
    );
}
