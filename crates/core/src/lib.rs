//! Despensa Core - Shared value types.
//!
//! This crate provides the value types used across all Despensa components:
//! - `storefront` - The client-side commerce state layer (catalog, cart, checkout)
//! - `cli` - Command-line driver for the storefront stores
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no persistence, no async.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
