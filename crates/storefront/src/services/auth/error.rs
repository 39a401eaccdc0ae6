//! Authentication error types.

use thiserror::Error;

use crate::forms::ValidationErrors;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] despensa_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The credential service could not be reached.
    #[error("authentication service unavailable")]
    Unavailable,

    /// Operation requires a logged-in user.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Profile form failed validation.
    #[error("profile validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// The shopper navigated away before the check finished.
    #[error("login cancelled")]
    Cancelled,
}

impl AuthError {
    /// Whether retrying the same request later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}
