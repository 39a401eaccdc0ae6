//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `DESPENSA_STORAGE_DIR` - Directory for persisted shopper state (default: .despensa)
//! - `DESPENSA_STORAGE_NAMESPACE` - Prefix of every persisted key (default: despensa)
//! - `DESPENSA_PAGE_SIZE` - Catalog page size (default: 12)
//! - `DESPENSA_PAYMENT_LATENCY_MS` - Simulated payment round trip (default: 1500)
//! - `DESPENSA_AUTH_LATENCY_MS` - Simulated login round trip (default: 800)
//! - `DESPENSA_PROMO_LATENCY_MS` - Simulated promo check (default: 500)
//! - `DESPENSA_PAYMENT_MAX_ATTEMPTS` - Payment attempts including the first (default: 3)
//! - `DESPENSA_PAYMENT_BACKOFF_MS` - Backoff before the first retry (default: 200)
//! - `DESPENSA_PAYMENT_TIMEOUT_SECS` - Hard timeout per payment attempt (default: 10)
//! - `MAPS_API_KEY` - Maps embed key for the contact page

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::catalog::DEFAULT_PAGE_SIZE;
use crate::services::payment::RetryPolicy;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Round trips of the simulated external services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub payment_latency: Duration,
    pub auth_latency: Duration,
    pub promo_latency: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            payment_latency: Duration::from_millis(1500),
            auth_latency: Duration::from_millis(800),
            promo_latency: Duration::from_millis(500),
        }
    }
}

/// Storefront application configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Directory holding persisted shopper state
    pub storage_dir: PathBuf,
    /// Namespace prefixed to every persisted key
    pub storage_namespace: String,
    /// Catalog listing page size
    pub page_size: usize,
    /// Simulated service latencies
    pub simulation: SimulationConfig,
    /// Retry, backoff and timeout for payment attempts
    pub payment_retry: RetryPolicy,
    /// Maps embed key, consumed read-only by the contact page
    pub maps_api_key: Option<SecretString>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("storage_dir", &self.storage_dir)
            .field("storage_namespace", &self.storage_namespace)
            .field("page_size", &self.page_size)
            .field("simulation", &self.simulation)
            .field("payment_retry", &self.payment_retry)
            .field(
                "maps_api_key",
                &self.maps_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(".despensa"),
            storage_namespace: "despensa".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            simulation: SimulationConfig::default(),
            payment_retry: RetryPolicy::default(),
            maps_api_key: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);
        let defaults = Self::default();

        let storage_namespace =
            env.get_or_default("DESPENSA_STORAGE_NAMESPACE", &defaults.storage_namespace);
        validate_namespace(&storage_namespace)?;

        let page_size: usize = env.parse_or("DESPENSA_PAGE_SIZE", defaults.page_size)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "DESPENSA_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let simulation = SimulationConfig {
            payment_latency: env.millis_or(
                "DESPENSA_PAYMENT_LATENCY_MS",
                defaults.simulation.payment_latency,
            )?,
            auth_latency: env.millis_or("DESPENSA_AUTH_LATENCY_MS", defaults.simulation.auth_latency)?,
            promo_latency: env.millis_or(
                "DESPENSA_PROMO_LATENCY_MS",
                defaults.simulation.promo_latency,
            )?,
        };

        let payment_retry = RetryPolicy {
            max_attempts: env.parse_or(
                "DESPENSA_PAYMENT_MAX_ATTEMPTS",
                defaults.payment_retry.max_attempts,
            )?,
            base_backoff: env.millis_or(
                "DESPENSA_PAYMENT_BACKOFF_MS",
                defaults.payment_retry.base_backoff,
            )?,
            attempt_timeout: Duration::from_secs(env.parse_or(
                "DESPENSA_PAYMENT_TIMEOUT_SECS",
                defaults.payment_retry.attempt_timeout.as_secs(),
            )?),
            ..defaults.payment_retry
        };

        Ok(Self {
            storage_dir: env
                .get_optional("DESPENSA_STORAGE_DIR")
                .map_or(defaults.storage_dir, PathBuf::from),
            storage_namespace,
            page_size,
            simulation,
            payment_retry,
            maps_api_key: env.get_optional("MAPS_API_KEY").map(SecretString::from),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable; blank counts as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_optional(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    fn millis_or(&self, key: &str, default: Duration) -> Result<Duration, ConfigError> {
        let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
        self.parse_or(key, default_ms).map(Duration::from_millis)
    }
}

/// Namespaces become part of storage keys and file names.
fn validate_namespace(namespace: &str) -> Result<(), ConfigError> {
    let valid = namespace
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            "DESPENSA_STORAGE_NAMESPACE".to_string(),
            "use only letters, digits, '-' and '_'".to_string(),
        ))
    }
}
