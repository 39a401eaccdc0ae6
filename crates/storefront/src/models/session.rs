//! Keys for shopper state persisted in local storage.
//!
//! Every key is stored under the application namespace from
//! [`crate::config::StorefrontConfig::storage_namespace`].

/// Storage keys for shopper session data.
pub mod keys {
    /// Cart line items (the drawer open flag is not persisted).
    pub const CART: &str = "cart";

    /// Favorite product IDs.
    pub const FAVORITES: &str = "favorites";

    /// Logged-in user record. Never contains the password.
    pub const AUTH: &str = "auth";

    /// Orders placed through checkout during this browser's lifetime.
    pub const PLACED_ORDERS: &str = "placed_orders";
}
