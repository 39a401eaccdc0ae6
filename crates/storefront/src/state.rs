//! Application state shared across shopper sessions.

use std::sync::Arc;

use tracing::info;

use crate::catalog::Catalog;
use crate::checkout::CheckoutSession;
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::fixtures::CheckoutOptions;
use crate::models::User;
use crate::orders::OrderBook;
use crate::services::auth::DemoDirectory;
use crate::services::payment::SimulatedGateway;
use crate::services::promo::PromoService;
use crate::storage::{FileStore, Storage};

/// Application state shared across all sessions.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// read-only catalog data and the simulated external services.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    order_book: OrderBook,
    checkout_options: CheckoutOptions,
    directory: DemoDirectory,
    gateway: SimulatedGateway,
    promo: PromoService,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("products", &self.inner.catalog.len())
            .field("directory", &self.inner.directory)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Load the bundled data and build the simulated services.
    ///
    /// # Errors
    ///
    /// Returns an error if a bundled fixture fails to load.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let catalog = Catalog::bundled()?.with_page_size(config.page_size);
        let order_book = OrderBook::bundled()?;
        let checkout_options = CheckoutOptions::bundled()?;
        let directory = DemoDirectory::bundled(config.simulation.auth_latency)?;
        let gateway = SimulatedGateway::new(config.simulation.payment_latency);
        let promo = PromoService::new(config.simulation.promo_latency);

        info!(
            products = catalog.len(),
            addresses = checkout_options.addresses.len(),
            payment_methods = checkout_options.payment_methods.len(),
            "storefront state loaded"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                order_book,
                checkout_options,
                directory,
                gateway,
                promo,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Sample order history, without orders placed on this device.
    #[must_use]
    pub fn order_book(&self) -> &OrderBook {
        &self.inner.order_book
    }

    #[must_use]
    pub fn checkout_options(&self) -> &CheckoutOptions {
        &self.inner.checkout_options
    }

    #[must_use]
    pub fn directory(&self) -> &DemoDirectory {
        &self.inner.directory
    }

    #[must_use]
    pub fn gateway(&self) -> &SimulatedGateway {
        &self.inner.gateway
    }

    #[must_use]
    pub fn promo(&self) -> &PromoService {
        &self.inner.promo
    }

    /// File-backed storage under the configured directory and namespace.
    #[must_use]
    pub fn storage(&self) -> Storage<FileStore> {
        let config = &self.inner.config;
        Storage::new(
            FileStore::new(&config.storage_dir),
            config.storage_namespace.clone(),
        )
    }

    /// Start a checkout, prefilled with the customer's email when logged in.
    #[must_use]
    pub fn start_checkout(&self, user: Option<&User>) -> CheckoutSession {
        let checkout = CheckoutSession::new(self.inner.checkout_options.clone());
        match user {
            Some(user) => checkout.with_customer(user.email.clone()),
            None => checkout,
        }
    }
}
