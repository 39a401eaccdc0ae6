//! Integration tests for Despensa.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p despensa-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Cart through confirmation, including payment failures
//! - `persistence` - Shopper session round trips through the file store
//! - `dashboard` - Order and invoice projection after checkout
//!
//! Every test gets its own [`TestContext`]: the bundled fixtures, simulated
//! services without latency, and a private storage directory.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::time::Duration;

use despensa_core::ProductId;
use despensa_storefront::config::{SimulationConfig, StorefrontConfig};
use despensa_storefront::models::Product;
use despensa_storefront::storage::{FileStore, Storage};
use despensa_storefront::{AppError, AppState};

/// Shared state over a temporary storage directory.
#[derive(Debug)]
pub struct TestContext {
    pub state: AppState,
    pub storage_dir: PathBuf,
}

impl TestContext {
    /// Build a context with instant simulated services.
    ///
    /// # Errors
    ///
    /// Returns an error if a bundled fixture fails to load.
    pub fn new() -> Result<Self, AppError> {
        Self::with_config(|_| {})
    }

    /// Build a context after adjusting the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a bundled fixture fails to load.
    pub fn with_config(adjust: impl FnOnce(&mut StorefrontConfig)) -> Result<Self, AppError> {
        let storage_dir =
            std::env::temp_dir().join(format!("despensa-it-{}", uuid::Uuid::new_v4()));
        let mut config = StorefrontConfig {
            storage_dir: storage_dir.clone(),
            simulation: SimulationConfig {
                payment_latency: Duration::ZERO,
                auth_latency: Duration::ZERO,
                promo_latency: Duration::ZERO,
            },
            ..StorefrontConfig::default()
        };
        adjust(&mut config);

        Ok(Self {
            state: AppState::new(config)?,
            storage_dir,
        })
    }

    /// File-backed storage in this context's directory.
    #[must_use]
    pub fn storage(&self) -> Storage<FileStore> {
        self.state.storage()
    }

    /// A catalog product by ID.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown ID.
    pub fn product(&self, id: &str) -> Result<&Product, AppError> {
        self.state
            .catalog()
            .get(&ProductId::from(id))
            .ok_or_else(|| AppError::NotFound(format!("Product {id}")))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.storage_dir).ok();
    }
}
