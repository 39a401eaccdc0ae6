//! External collaborators of the storefront.
//!
//! # Services
//!
//! - `auth` - Credential verification (demo directory with Argon2 hashes)
//! - `payment` - Payment gateway seam with retry, timeout and cancellation
//! - `promo` - Promo code validation

pub mod auth;
pub mod payment;
pub mod promo;

pub use auth::{AuthError, CredentialVerifier, DemoDirectory};
pub use payment::{
    PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest, RetryPolicy, SimulatedGateway,
    SimulatedOutcome,
};
pub use promo::{PromoError, PromoService};
