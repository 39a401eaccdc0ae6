//! Auth store: the logged-in user of a shopper session.
//!
//! A failed or cancelled login leaves the state exactly as it was. Logout is
//! unconditional.

use tracing::{info, instrument, warn};

use despensa_core::Email;

use crate::cancel::CancelToken;
use crate::forms::ProfileForm;
use crate::models::{AuthState, User};
use crate::services::auth::{AuthError, CredentialVerifier};

/// The shopper's authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthStore {
    state: AuthState,
}

impl AuthStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn from_state(state: AuthState) -> Self {
        Self { state }
    }

    #[must_use]
    pub const fn state(&self) -> &AuthState {
        &self.state
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// Gate for the dashboard and checkout.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` when nobody is logged in.
    pub fn require_user(&self) -> Result<&User, AuthError> {
        self.user().ok_or(AuthError::NotAuthenticated)
    }

    /// Log in with an email and password.
    ///
    /// Returns `Ok(true)` and stores the user when the credentials match,
    /// `Ok(false)` when they do not (including a malformed email).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unavailable` when the credential check cannot be
    /// made and `AuthError::Cancelled` when `cancel` fires first. The state is
    /// unchanged in both cases.
    #[instrument(skip(self, verifier, password, cancel))]
    pub async fn login<V: CredentialVerifier>(
        &mut self,
        verifier: &V,
        email: &str,
        password: &str,
        cancel: &CancelToken,
    ) -> Result<bool, AuthError> {
        let Ok(email) = Email::parse(email) else {
            warn!("login rejected: malformed email");
            return Ok(false);
        };

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(AuthError::Cancelled),
            outcome = verifier.verify(&email, password) => outcome,
        };

        match outcome {
            Ok(user) => {
                info!(email = %user.email, "user logged in");
                self.state.user = Some(user);
                Ok(true)
            }
            Err(AuthError::InvalidCredentials) => {
                warn!(email = %email, "login rejected: invalid credentials");
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                Err(e)
            }
        }
    }

    /// Clear the session's user.
    pub fn logout(&mut self) {
        if let Some(user) = self.state.user.take() {
            info!(email = %user.email, "user logged out");
        }
    }

    /// Replace the user record from the dashboard profile form.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` when nobody is logged in and
    /// `AuthError::Validation` with every failed field otherwise.
    pub fn update_profile(&mut self, form: &ProfileForm) -> Result<&User, AuthError> {
        self.require_user()?;
        let updated = form.validate()?;
        info!(email = %updated.email, "profile updated");
        Ok(self.state.user.insert(updated))
    }
}
