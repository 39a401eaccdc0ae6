//! Promo code validation.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::cancel::CancelToken;
use crate::checkout::pricing;

/// Errors from applying a promo code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromoError {
    #[error("enter a promo code")]
    Empty,

    #[error("promo code is not valid")]
    Invalid,

    #[error("promo check cancelled")]
    Cancelled,
}

/// Simulated promo lookup with a fixed round trip.
#[derive(Debug, Clone)]
pub struct PromoService {
    latency: Duration,
}

impl PromoService {
    #[must_use]
    pub const fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Check a code.
    ///
    /// # Errors
    ///
    /// Returns `PromoError::Empty` for a blank code without waiting,
    /// `PromoError::Invalid` when it does not match, and
    /// `PromoError::Cancelled` when `cancel` fires first.
    #[instrument(skip(self, cancel))]
    pub async fn validate(&self, code: &str, cancel: &CancelToken) -> Result<(), PromoError> {
        if code.trim().is_empty() {
            return Err(PromoError::Empty);
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(PromoError::Cancelled),
            () = tokio::time::sleep(self.latency) => {}
        }

        let valid = pricing::promo_matches(code);
        debug!(valid, "promo code checked");
        if valid { Ok(()) } else { Err(PromoError::Invalid) }
    }
}
