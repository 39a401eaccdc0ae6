//! Authentication service.
//!
//! The credential check is an external collaborator behind
//! [`CredentialVerifier`]. [`DemoDirectory`] is the in-process stand-in used
//! by the storefront: a fixed set of accounts with Argon2id password hashes
//! and a simulated round trip.

mod error;

pub use error::AuthError;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::Rng;
use tracing::{debug, instrument};

use despensa_core::Email;

use crate::fixtures;
use crate::models::User;

/// Minimum password length accepted by the login form.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Checks an email/password pair against the account directory.
pub trait CredentialVerifier: Send + Sync {
    /// Resolve the account for a credential pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when the pair does not match and
    /// `AuthError::Unavailable` when the directory cannot be reached.
    fn verify(
        &self,
        email: &Email,
        password: &str,
    ) -> impl Future<Output = Result<User, AuthError>> + Send;
}

struct Account {
    user: User,
    password_hash: String,
}

/// In-memory account directory with simulated latency.
pub struct DemoDirectory {
    accounts: Vec<Account>,
    latency: Duration,
    available: AtomicBool,
}

impl std::fmt::Debug for DemoDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoDirectory")
            .field("accounts", &self.accounts.len())
            .field("latency", &self.latency)
            .field("available", &self.available.load(Ordering::Relaxed))
            .finish()
    }
}

impl DemoDirectory {
    /// Create a directory from `(user, password)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if a password cannot be hashed.
    pub fn new(
        accounts: impl IntoIterator<Item = (User, impl AsRef<str>)>,
        latency: Duration,
    ) -> Result<Self, AuthError> {
        let accounts = accounts
            .into_iter()
            .map(|(user, password)| {
                Ok(Account {
                    password_hash: hash_password(password.as_ref())?,
                    user,
                })
            })
            .collect::<Result<Vec<_>, AuthError>>()?;

        Ok(Self {
            accounts,
            latency,
            available: AtomicBool::new(true),
        })
    }

    /// The bundled demo accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled accounts are malformed.
    pub fn bundled(latency: Duration) -> Result<Self, AuthError> {
        Self::new(fixtures::demo_accounts()?, latency)
    }

    /// Simulate the directory going down (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    fn find(&self, email: &Email) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|account| account.user.email.matches(email))
    }
}

impl CredentialVerifier for DemoDirectory {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn verify(&self, email: &Email, password: &str) -> Result<User, AuthError> {
        tokio::time::sleep(self.latency).await;

        if !self.available.load(Ordering::Relaxed) {
            return Err(AuthError::Unavailable);
        }

        let account = self.find(email).ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &account.password_hash)?;

        debug!("credentials verified");
        Ok(account.user.clone())
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Argon2id tuned for an interactive demo rather than a server.
fn hasher() -> Result<Argon2<'static>, AuthError> {
    let params = Params::new(8 * 1024, 1, 1, None).map_err(|_| AuthError::PasswordHash)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    let salt = SaltString::encode_b64(&bytes).map_err(|_| AuthError::PasswordHash)?;

    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    hasher()?
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
