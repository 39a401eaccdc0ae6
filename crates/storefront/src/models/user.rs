//! User domain types.

use serde::{Deserialize, Serialize};

use despensa_core::Email;

/// A logged-in storefront customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Contact name.
    pub name: String,
    /// Login and contact email.
    pub email: Email,
    /// Business the customer buys for (restaurant, shop, ...).
    pub company: String,
    pub phone: String,
}

/// Authentication state for one shopper session.
///
/// `is_authenticated` is derived from the presence of a user, so the two can
/// never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    pub user: Option<User>,
}

impl AuthState {
    /// Whether a user is logged in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}
