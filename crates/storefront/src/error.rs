//! Application error type.
//!
//! Every failure the storefront can surface converges on [`AppError`].
//! Callers show [`AppError::user_message`] to the shopper; the `Display`
//! form carries the internal detail and belongs in logs only.

use thiserror::Error;
use tracing::error;

use crate::catalog::CatalogError;
use crate::checkout::{GuardError, PlaceOrderError, SelectionError, TransitionError};
use crate::config::ConfigError;
use crate::forms::ValidationErrors;
use crate::services::auth::AuthError;
use crate::services::payment::PaymentError;
use crate::services::promo::PromoError;
use crate::storage::StorageError;

/// Shown for any failure whose detail the shopper cannot act on.
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A bundled fixture other than the catalog failed to parse.
    #[error("Fixture error: {0}")]
    Fixture(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Checkout error: {0}")]
    Transition(#[from] TransitionError),

    #[error("Checkout error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Promo error: {0}")]
    Promo(#[from] PromoError),

    #[error("Order error: {0}")]
    PlaceOrder(#[from] PlaceOrderError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<GuardError> for AppError {
    fn from(err: GuardError) -> Self {
        Self::Transition(TransitionError::Guard(err))
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        Self::PlaceOrder(PlaceOrderError::Payment(err))
    }
}

impl AppError {
    /// Message safe to show the shopper.
    ///
    /// Guard and validation failures say exactly what to fix. Transport and
    /// internal failures collapse to [`GENERIC_MESSAGE`]; their detail is
    /// logged here instead.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(err) => auth_message(err),
            Self::Validation(errors) => errors.to_string(),
            Self::Transition(err) => transition_message(err),
            Self::Selection(_) => "That option is no longer available.".to_string(),
            Self::Promo(err) => promo_message(err),
            Self::PlaceOrder(err) => place_order_message(err),
            Self::NotFound(what) => format!("{what} not found."),
            Self::Config(_) | Self::Catalog(_) | Self::Fixture(_) | Self::Storage(_) => {
                error!(error = %self, "internal error");
                GENERIC_MESSAGE.to_string()
            }
        }
    }

    /// Whether retrying the same action later may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Auth(err) => err.is_transient(),
            Self::PlaceOrder(PlaceOrderError::Payment(err)) => err.is_transient(),
            Self::Storage(StorageError::Io(_)) => true,
            _ => false,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn auth_message(err: &AuthError) -> String {
    match err {
        AuthError::InvalidEmail(_) | AuthError::InvalidCredentials => {
            "Incorrect email or password.".to_string()
        }
        AuthError::NotAuthenticated => "Please log in to continue.".to_string(),
        AuthError::Validation(errors) => errors.to_string(),
        AuthError::Cancelled => "Login cancelled.".to_string(),
        AuthError::Unavailable | AuthError::PasswordHash => {
            error!(error = %err, "authentication failure");
            GENERIC_MESSAGE.to_string()
        }
    }
}

fn transition_message(err: &TransitionError) -> String {
    match err {
        TransitionError::Guard(guard) => guard.to_string(),
        TransitionError::AwaitingPayment => "Place the order to finish checkout.".to_string(),
        TransitionError::Completed => "This order has already been placed.".to_string(),
        TransitionError::AtFirstStep => "You are already at the first step.".to_string(),
        TransitionError::NotVisited(step) => format!("Complete the steps before {step} first."),
    }
}

fn promo_message(err: &PromoError) -> String {
    match err {
        PromoError::Empty => "Enter a promo code.".to_string(),
        PromoError::Invalid => "That promo code is not valid.".to_string(),
        PromoError::Cancelled => "Promo check cancelled.".to_string(),
    }
}

fn place_order_message(err: &PlaceOrderError) -> String {
    match err {
        PlaceOrderError::Guard(guard) => guard.to_string(),
        PlaceOrderError::WrongStep(_) => "Complete the previous checkout steps first.".to_string(),
        PlaceOrderError::Payment(PaymentError::Declined(_)) => {
            "Your payment was declined. Try another payment method.".to_string()
        }
        PlaceOrderError::Payment(PaymentError::Cancelled) => {
            "Payment cancelled. Your cart has been kept.".to_string()
        }
        PlaceOrderError::Payment(payment) => {
            error!(error = %payment, "payment failure");
            GENERIC_MESSAGE.to_string()
        }
    }
}
