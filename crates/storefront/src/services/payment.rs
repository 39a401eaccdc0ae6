//! Payment gateway seam.
//!
//! Order placement charges through a [`PaymentGateway`]. Every attempt runs
//! under a hard timeout; transient failures are retried with exponential
//! backoff and jitter up to [`RetryPolicy::max_attempts`]; declines are final.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use despensa_core::{Email, PaymentMethodId, Price};

use crate::cancel::CancelToken;

/// A charge to be made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Idempotency reference, reused across retries of the same charge.
    pub reference: Uuid,
    pub amount: Price,
    pub payment_method: PaymentMethodId,
    pub customer: Option<Email>,
}

/// Proof of a successful charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub reference: Uuid,
    pub amount: Price,
}

/// Errors returned by a payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// The issuer refused the charge.
    #[error("payment declined: {0}")]
    Declined(String),

    /// The request did not reach the gateway or the reply was lost.
    #[error("network error: {0}")]
    Network(String),

    /// The gateway is temporarily refusing requests.
    #[error("payment service unavailable")]
    Unavailable,

    /// An attempt exceeded the hard timeout.
    #[error("payment timed out")]
    Timeout,

    /// The shopper left checkout before the charge finished.
    #[error("payment cancelled")]
    Cancelled,
}

impl PaymentError {
    /// Whether the same charge may succeed if retried.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Unavailable | Self::Timeout)
    }
}

/// Charges a payment method.
pub trait PaymentGateway: Send + Sync {
    /// Make one charge attempt.
    ///
    /// # Errors
    ///
    /// Returns a `PaymentError` describing why the charge failed.
    fn charge(
        &self,
        request: &PaymentRequest,
    ) -> impl Future<Output = Result<PaymentReceipt, PaymentError>> + Send;
}

// =============================================================================
// Retry Policy
// =============================================================================

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first one included. Zero is treated as one.
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles after each failure.
    pub base_backoff: Duration,
    /// Backoff cap.
    pub max_backoff: Duration,
    /// Hard timeout for a single attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Upper bound of the wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn backoff_ceiling(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_backoff
            .saturating_mul(1 << exponent)
            .min(self.max_backoff)
    }

    /// Jittered wait after failed attempt number `attempt`: uniformly drawn
    /// from the upper half of [`Self::backoff_ceiling`].
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ceiling = self.backoff_ceiling(attempt);
        let half = ceiling / 2;
        let jitter_ms = u64::try_from(half.as_millis()).unwrap_or(u64::MAX);
        let jitter = Duration::from_millis(rand::rng().random_range(0..=jitter_ms));
        (ceiling - half + jitter).min(ceiling)
    }

    const fn attempts(&self) -> u32 {
        if self.max_attempts == 0 { 1 } else { self.max_attempts }
    }
}

/// Charge with per-attempt timeout, retries and cancellation.
///
/// # Errors
///
/// Returns the first non-transient error, the last transient error once
/// attempts run out, or `PaymentError::Cancelled`.
#[instrument(skip(gateway, policy, cancel), fields(reference = %request.reference, amount = %request.amount))]
pub async fn charge_with_retry<G: PaymentGateway>(
    gateway: &G,
    request: &PaymentRequest,
    policy: &RetryPolicy,
    cancel: &CancelToken,
) -> Result<PaymentReceipt, PaymentError> {
    let max_attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(PaymentError::Cancelled),
            result = tokio::time::timeout(policy.attempt_timeout, gateway.charge(request)) => {
                result.unwrap_or(Err(PaymentError::Timeout))
            }
        };

        match result {
            Ok(receipt) => {
                info!(attempt, transaction = %receipt.transaction_id, "payment approved");
                return Ok(receipt);
            }
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let delay = policy.backoff(attempt);
                warn!(attempt, max_attempts, error = %e, ?delay, "payment attempt failed, retrying");
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Err(PaymentError::Cancelled),
                    () = tokio::time::sleep(delay) => {}
                }
            }
            Err(e) => {
                error!(attempt, error = %e, "payment failed");
                return Err(e);
            }
        }
    }
}

// =============================================================================
// Simulated Gateway
// =============================================================================

/// Scripted result of one simulated charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatedOutcome {
    Approve,
    Fail(PaymentError),
    /// Never answer; only the attempt timeout ends it.
    Stall,
}

/// Stand-in payment processor with a fixed round trip.
///
/// Approves every charge unless outcomes were scripted, in which case they
/// are consumed one per attempt before falling back to approval.
#[derive(Debug)]
pub struct SimulatedGateway {
    latency: Duration,
    script: Mutex<VecDeque<SimulatedOutcome>>,
    attempts: AtomicU32,
}

impl SimulatedGateway {
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            script: Mutex::new(VecDeque::new()),
            attempts: AtomicU32::new(0),
        }
    }

    /// Queue outcomes for the next attempts.
    #[must_use]
    pub fn with_script(self, outcomes: impl IntoIterator<Item = SimulatedOutcome>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(outcomes);
        self
    }

    /// Charge attempts seen so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }

    fn next_outcome(&self) -> SimulatedOutcome {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(SimulatedOutcome::Approve)
    }
}

impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        let outcome = self.next_outcome();

        tokio::time::sleep(self.latency).await;

        match outcome {
            SimulatedOutcome::Approve => Ok(PaymentReceipt {
                transaction_id: format!("TX-{}", Uuid::new_v4().simple()).to_uppercase(),
                reference: request.reference,
                amount: request.amount,
            }),
            SimulatedOutcome::Fail(e) => Err(e),
            SimulatedOutcome::Stall => std::future::pending().await,
        }
    }
}
