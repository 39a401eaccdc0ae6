//! Integration tests for shopper state persistence.
//!
//! Sessions are saved to and restored from the file store the way two
//! consecutive CLI runs would see them.

#![allow(clippy::unwrap_used)]

use despensa_core::ProductId;
use despensa_integration_tests::TestContext;
use despensa_storefront::cancel::CancelToken;
use despensa_storefront::fixtures::{DEMO_EMAIL, DEMO_PASSWORD};
use despensa_storefront::session::ShopperSession;
use despensa_storefront::storage::{FileStore, KeyValueStore, Storage};

#[tokio::test]
async fn test_session_survives_restart() {
    let ctx = TestContext::new().unwrap();
    let storage = ctx.storage();

    let mut session = ShopperSession::load(&storage).unwrap();
    assert_eq!(session, ShopperSession::new());

    session.cart.add_item(ctx.product("pulpo-cocido").unwrap(), 2);
    session.cart.add_item(ctx.product("yogur-oveja").unwrap(), 6);
    session.cart.open_cart();
    session.favorites.toggle(&ProductId::from("anchoas-santona"));
    session
        .auth
        .login(
            ctx.state.directory(),
            DEMO_EMAIL,
            DEMO_PASSWORD,
            &CancelToken::never(),
        )
        .await
        .unwrap();
    session.save(&storage).unwrap();

    let restored = ShopperSession::load(&ctx.storage()).unwrap();
    assert_eq!(restored.cart.lines(), session.cart.lines());
    assert_eq!(restored.cart.total_items(), 8);
    assert!(!restored.cart.is_open());
    assert!(
        restored
            .favorites
            .is_favorite(&ProductId::from("anchoas-santona"))
    );
    assert_eq!(restored.auth.user().unwrap().email.as_str(), DEMO_EMAIL);
}

#[tokio::test]
async fn test_password_never_persisted() {
    let ctx = TestContext::new().unwrap();
    let storage = ctx.storage();

    let mut session = ShopperSession::new();
    session
        .auth
        .login(
            ctx.state.directory(),
            DEMO_EMAIL,
            DEMO_PASSWORD,
            &CancelToken::never(),
        )
        .await
        .unwrap();
    session.save(&storage).unwrap();

    let raw = storage.store().get(&storage.key("auth")).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["user"]["email"], DEMO_EMAIL);
    assert!(!raw.contains(DEMO_PASSWORD));
    assert!(!raw.contains("argon2"));
}

#[test]
fn test_cart_snapshot_round_trip() {
    let ctx = TestContext::new().unwrap();
    let storage = ctx.storage();

    let mut session = ShopperSession::new();
    session.cart.add_item(ctx.product("pollo-corral").unwrap(), 3);
    session.save(&storage).unwrap();

    let restored = ShopperSession::load(&storage).unwrap();
    let line = restored.cart.line(&ProductId::from("pollo-corral")).unwrap();
    assert_eq!(line.product.unit_price, ctx.product("pollo-corral").unwrap().price);
    assert_eq!(restored.cart.total_price(), session.cart.total_price());
}

#[test]
fn test_corrupt_files_start_fresh() {
    let ctx = TestContext::new().unwrap();
    let storage = ctx.storage();

    let mut session = ShopperSession::new();
    session.favorites.toggle(&ProductId::from("aceite-oliva"));
    session.cart.add_item(ctx.product("aceite-oliva").unwrap(), 1);
    session.save(&storage).unwrap();

    storage
        .store()
        .set(&storage.key("cart"), "{\"lines\": [oops")
        .unwrap();

    let restored = ShopperSession::load(&storage).unwrap();
    assert!(restored.cart.is_empty());
    assert_eq!(restored.favorites.count(), 1);
}

#[test]
fn test_namespaces_do_not_share_state() {
    let ctx = TestContext::new().unwrap();
    let other = TestContext::with_config(|config| {
        config.storage_namespace = "otra-tienda".to_string();
    })
    .unwrap();
    let shared = Storage::new(
        FileStore::new(&ctx.storage_dir),
        other.state.config().storage_namespace.clone(),
    );

    let mut session = ShopperSession::new();
    session.favorites.toggle(&ProductId::from("noras-secas"));
    session.save(&ctx.storage()).unwrap();

    let foreign = ShopperSession::load(&shared).unwrap();
    assert_eq!(foreign.favorites.count(), 0);
    assert_eq!(
        ShopperSession::load(&ctx.storage()).unwrap().favorites.count(),
        1
    );
}

#[tokio::test]
async fn test_logout_persists() {
    let ctx = TestContext::new().unwrap();
    let storage = ctx.storage();

    let mut session = ShopperSession::new();
    session
        .auth
        .login(
            ctx.state.directory(),
            DEMO_EMAIL,
            DEMO_PASSWORD,
            &CancelToken::never(),
        )
        .await
        .unwrap();
    session.save(&storage).unwrap();
    assert!(ShopperSession::load(&storage).unwrap().auth.is_authenticated());

    session.auth.logout();
    session.save(&storage).unwrap();
    assert!(!ShopperSession::load(&storage).unwrap().auth.is_authenticated());
}
