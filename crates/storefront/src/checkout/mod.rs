//! Checkout pipeline.
//!
//! A linear four-step flow: Cart → Shipping → Payment → Confirmation.
//! `next()` checks the current step's guard before advancing and reports the
//! exact reason when it refuses. Confirmation is only reached by placing the
//! order (see [`CheckoutSession::place_order`]), and nothing moves after it.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut checkout = CheckoutSession::new(CheckoutOptions::bundled()?);
//! checkout.next(&cart)?;                       // Cart → Shipping
//! checkout.select_address(&AddressId::from("addr-restaurante"))?;
//! checkout.next(&cart)?;                       // Shipping → Payment
//! checkout.select_payment(&PaymentMethodId::from("pm-visa"))?;
//! checkout.set_terms(true);
//! let confirmation = checkout
//!     .place_order(&mut cart, &gateway, &RetryPolicy::default(), &cancel)
//!     .await?;
//! ```

pub mod placement;
pub mod pricing;

pub use placement::{OrderConfirmation, PlaceOrderError};
pub use pricing::PriceSummary;

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use despensa_core::{AddressId, Email, PaymentMethodId};

use crate::cancel::CancelToken;
use crate::cart::CartStore;
use crate::fixtures::CheckoutOptions;
use crate::models::{PaymentMethod, ShippingAddress};
use crate::services::promo::{PromoError, PromoService};

// =============================================================================
// Steps
// =============================================================================

/// A checkout step.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Cart,
    Shipping,
    Payment,
    Confirmation,
}

impl CheckoutStep {
    pub const ALL: [Self; 4] = [Self::Cart, Self::Shipping, Self::Payment, Self::Confirmation];

    /// Zero-based position in the flow.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Cart => 0,
            Self::Shipping => 1,
            Self::Payment => 2,
            Self::Confirmation => 3,
        }
    }

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Cart => Some(Self::Shipping),
            Self::Shipping => Some(Self::Payment),
            Self::Payment => Some(Self::Confirmation),
            Self::Confirmation => None,
        }
    }

    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Cart => None,
            Self::Shipping => Some(Self::Cart),
            Self::Payment => Some(Self::Shipping),
            Self::Confirmation => Some(Self::Payment),
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Cart => "Cart",
            Self::Shipping => "Shipping",
            Self::Payment => "Payment",
            Self::Confirmation => "Confirmation",
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// A failed step guard. The message is the prompt shown to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("Your cart is empty. Add some products before checking out.")]
    EmptyCart,

    #[error("Select a shipping address to continue.")]
    NoAddress,

    #[error("Select a payment method to continue.")]
    NoPayment,

    #[error("You must accept the terms and conditions to continue.")]
    TermsNotAccepted,
}

/// Why a step change was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// Payment is left by placing the order, not by `next()`.
    #[error("place the order to continue")]
    AwaitingPayment,

    /// The order was already placed.
    #[error("checkout is complete")]
    Completed,

    #[error("already at the first step")]
    AtFirstStep,

    /// `go_to` only jumps backwards.
    #[error("cannot jump ahead to {0}")]
    NotVisited(CheckoutStep),
}

/// A selection that does not name a saved option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown shipping address: {0}")]
    UnknownAddress(AddressId),

    #[error("unknown payment method: {0}")]
    UnknownPayment(PaymentMethodId),
}

// =============================================================================
// Session
// =============================================================================

/// Promo code entered by the shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PromoState {
    pub code: String,
    pub applied: bool,
}

/// State of one checkout attempt.
///
/// Lives for a single visit to checkout and is never persisted.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    options: CheckoutOptions,
    customer: Option<Email>,
    step: CheckoutStep,
    selected_address: Option<AddressId>,
    selected_payment: Option<PaymentMethodId>,
    promo: PromoState,
    agree_to_terms: bool,
    confirmation: Option<OrderConfirmation>,
}

impl CheckoutSession {
    /// Start at the cart step with nothing selected.
    #[must_use]
    pub fn new(options: CheckoutOptions) -> Self {
        Self {
            options,
            customer: None,
            step: CheckoutStep::Cart,
            selected_address: None,
            selected_payment: None,
            promo: PromoState::default(),
            agree_to_terms: false,
            confirmation: None,
        }
    }

    /// Attach the logged-in customer's email to the payment request.
    #[must_use]
    pub fn with_customer(mut self, email: Email) -> Self {
        self.customer = Some(email);
        self
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub const fn options(&self) -> &CheckoutOptions {
        &self.options
    }

    #[must_use]
    pub fn selected_address(&self) -> Option<&ShippingAddress> {
        let id = self.selected_address.as_ref()?;
        self.options.addresses.iter().find(|a| a.id == *id)
    }

    #[must_use]
    pub fn selected_payment(&self) -> Option<&PaymentMethod> {
        let id = self.selected_payment.as_ref()?;
        self.options.payment_methods.iter().find(|m| m.id == *id)
    }

    #[must_use]
    pub const fn promo(&self) -> &PromoState {
        &self.promo
    }

    #[must_use]
    pub const fn agree_to_terms(&self) -> bool {
        self.agree_to_terms
    }

    /// The placed order, once checkout is complete.
    #[must_use]
    pub const fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    /// The order summary for the current cart and promo state.
    #[must_use]
    pub fn summary(&self, cart: &CartStore) -> PriceSummary {
        pricing::summarize(cart.total_price(), self.promo.applied)
    }

    // =========================================================================
    // Guards and Transitions
    // =========================================================================

    /// Check the guard that must hold to leave `step`.
    ///
    /// # Errors
    ///
    /// Returns the specific unmet condition.
    pub fn check_guard(&self, step: CheckoutStep, cart: &CartStore) -> Result<(), GuardError> {
        match step {
            CheckoutStep::Cart if cart.is_empty() => Err(GuardError::EmptyCart),
            CheckoutStep::Shipping if self.selected_address().is_none() => {
                Err(GuardError::NoAddress)
            }
            CheckoutStep::Payment if self.selected_payment().is_none() => {
                Err(GuardError::NoPayment)
            }
            CheckoutStep::Payment if !self.agree_to_terms => Err(GuardError::TermsNotAccepted),
            _ => Ok(()),
        }
    }

    /// Check every guard up to and including the payment step.
    pub(crate) fn check_all_guards(&self, cart: &CartStore) -> Result<(), GuardError> {
        [CheckoutStep::Cart, CheckoutStep::Shipping, CheckoutStep::Payment]
            .into_iter()
            .try_for_each(|step| self.check_guard(step, cart))
    }

    /// Advance one step.
    ///
    /// # Errors
    ///
    /// Returns the failed guard, `AwaitingPayment` from the payment step (the
    /// order must be placed instead), or `Completed` after confirmation. The
    /// step is unchanged on error.
    pub fn next(&mut self, cart: &CartStore) -> Result<CheckoutStep, TransitionError> {
        let Some(target) = self.step.next() else {
            return Err(TransitionError::Completed);
        };

        if let Err(reason) = self.check_guard(self.step, cart) {
            warn!(step = %self.step, %reason, "checkout step refused");
            return Err(reason.into());
        }
        if target == CheckoutStep::Confirmation {
            return Err(TransitionError::AwaitingPayment);
        }

        debug!(from = %self.step, to = %target, "checkout advanced");
        self.step = target;
        Ok(target)
    }

    /// Go back one step.
    ///
    /// # Errors
    ///
    /// Returns `AtFirstStep` from the cart and `Completed` after confirmation.
    pub fn back(&mut self) -> Result<CheckoutStep, TransitionError> {
        if self.step == CheckoutStep::Confirmation {
            return Err(TransitionError::Completed);
        }
        let target = self.step.previous().ok_or(TransitionError::AtFirstStep)?;
        debug!(from = %self.step, to = %target, "checkout went back");
        self.step = target;
        Ok(target)
    }

    /// Jump back to an earlier step (step indicator navigation).
    ///
    /// # Errors
    ///
    /// Returns `NotVisited` for a later step and `Completed` after
    /// confirmation.
    pub fn go_to(&mut self, step: CheckoutStep) -> Result<CheckoutStep, TransitionError> {
        if self.step == CheckoutStep::Confirmation {
            return Err(TransitionError::Completed);
        }
        if step > self.step {
            return Err(TransitionError::NotVisited(step));
        }
        self.step = step;
        Ok(step)
    }

    // =========================================================================
    // Selections
    // =========================================================================

    /// Choose a saved shipping address.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAddress` if no saved address has this ID; the previous
    /// selection is kept.
    pub fn select_address(&mut self, id: &AddressId) -> Result<(), SelectionError> {
        if !self.options.addresses.iter().any(|a| a.id == *id) {
            return Err(SelectionError::UnknownAddress(id.clone()));
        }
        self.selected_address = Some(id.clone());
        Ok(())
    }

    /// Choose a saved payment method.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPayment` if no saved method has this ID; the previous
    /// selection is kept.
    pub fn select_payment(&mut self, id: &PaymentMethodId) -> Result<(), SelectionError> {
        if !self.options.payment_methods.iter().any(|m| m.id == *id) {
            return Err(SelectionError::UnknownPayment(id.clone()));
        }
        self.selected_payment = Some(id.clone());
        Ok(())
    }

    pub const fn set_terms(&mut self, accepted: bool) {
        self.agree_to_terms = accepted;
    }

    // =========================================================================
    // Promo
    // =========================================================================

    /// Check and apply a promo code.
    ///
    /// # Errors
    ///
    /// Returns a `PromoError` and leaves the promo state untouched when the
    /// code is blank, does not match, or the check is cancelled.
    #[instrument(skip(self, service, cancel))]
    pub async fn apply_promo(
        &mut self,
        service: &PromoService,
        code: &str,
        cancel: &CancelToken,
    ) -> Result<(), PromoError> {
        service.validate(code, cancel).await?;
        self.promo = PromoState {
            code: code.trim().to_uppercase(),
            applied: true,
        };
        info!(code = %self.promo.code, "promo applied");
        Ok(())
    }

    pub fn remove_promo(&mut self) {
        self.promo = PromoState::default();
    }
}
