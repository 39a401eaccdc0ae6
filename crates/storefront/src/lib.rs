//! Despensa storefront library.
//!
//! The commerce state layer of a B2B food storefront: a read-only catalog
//! with filtering and pagination, a persistent cart and favorites list, a
//! guarded four-step checkout backed by simulated payment and promo
//! services, and the account dashboard's order and invoice views.
//!
//! Everything runs against bundled fixtures; there is no backend.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cancel;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod favorites;
pub mod fixtures;
pub mod forms;
pub mod models;
pub mod orders;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;

pub use error::AppError;
pub use state::AppState;
