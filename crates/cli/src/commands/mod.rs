//! CLI command implementations.
//!
//! Each command works on a [`Shop`] and returns the text to print. Shopper
//! state is loaded before the command runs and saved after it succeeds.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod favorites;

use despensa_core::ProductId;
use despensa_storefront::config::StorefrontConfig;
use despensa_storefront::models::Product;
use despensa_storefront::session::ShopperSession;
use despensa_storefront::storage::{FileStore, Storage};
use despensa_storefront::{AppError, AppState};

/// Shared state plus the persisted session of the current shopper.
pub struct Shop {
    pub state: AppState,
    pub storage: Storage<FileStore>,
    pub session: ShopperSession,
}

impl Shop {
    /// Load the bundled data and restore the shopper session.
    ///
    /// # Errors
    ///
    /// Returns an error if a fixture fails to load or the storage directory
    /// cannot be read.
    pub fn open(config: StorefrontConfig) -> Result<Self, AppError> {
        let state = AppState::new(config)?;
        let storage = state.storage();
        let session = ShopperSession::load(&storage)?;
        Ok(Self {
            state,
            storage,
            session,
        })
    }

    /// Persist the shopper session.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be written.
    pub fn save(&self) -> Result<(), AppError> {
        self.session.save(&self.storage)?;
        Ok(())
    }

    /// A catalog product, or `NotFound`.
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
