//! Order placement: the "pay" action at the end of checkout.

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use despensa_core::{OrderId, OrderStatus};

use super::{CheckoutSession, CheckoutStep, GuardError, PriceSummary};
use crate::cancel::CancelToken;
use crate::cart::CartStore;
use crate::models::{Order, OrderItem};
use crate::services::payment::{
    PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest, RetryPolicy, charge_with_retry,
};

/// Result of a successful order placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderConfirmation {
    pub order: Order,
    pub summary: PriceSummary,
    pub receipt: PaymentReceipt,
}

/// Why an order could not be placed. Checkout stays on the payment step
/// with the cart intact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceOrderError {
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// Orders are placed from the payment step only.
    #[error("cannot place the order from the {0} step")]
    WrongStep(CheckoutStep),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

/// Generate an order number such as `ORD-2024-3F2A9C1B`.
#[must_use]
pub fn generate_order_id(date: NaiveDate) -> OrderId {
    let (suffix, ..) = Uuid::new_v4().as_fields();
    OrderId::new(format!("ORD-{}-{suffix:08X}", date.year()))
}

impl CheckoutSession {
    /// Charge the selected payment method and place the order.
    ///
    /// Every guard is checked again first. On success the cart is cleared and
    /// checkout moves to Confirmation. On failure nothing changes: the step
    /// stays on Payment and the cart keeps its lines.
    ///
    /// # Errors
    ///
    /// Returns `WrongStep` outside the payment step, the first failed guard,
    /// or the payment error after retries.
    #[instrument(skip_all, fields(step = %self.step))]
    pub async fn place_order<G: PaymentGateway>(
        &mut self,
        cart: &mut CartStore,
        gateway: &G,
        policy: &RetryPolicy,
        cancel: &CancelToken,
    ) -> Result<OrderConfirmation, PlaceOrderError> {
        if self.step != CheckoutStep::Payment {
            return Err(PlaceOrderError::WrongStep(self.step));
        }
        self.check_all_guards(cart)?;

        let address = self.selected_address().ok_or(GuardError::NoAddress)?;
        let payment = self.selected_payment().ok_or(GuardError::NoPayment)?;
        let shipping_label = address.to_string();
        let payment_label = payment.to_string();
        let summary = self.summary(cart);

        let request = PaymentRequest {
            reference: Uuid::new_v4(),
            amount: summary.total.round_cents(),
            payment_method: payment.id.clone(),
            customer: self.customer.clone(),
        };

        let receipt = charge_with_retry(gateway, &request, policy, cancel).await?;

        let date = Local::now().date_naive();
        let order = Order {
            id: generate_order_id(date),
            date,
            status: OrderStatus::Processing,
            total: summary.total,
            items: cart
                .lines()
                .iter()
                .map(|line| OrderItem {
                    product_id: Some(line.product.id.clone()),
                    name: line.product.name.clone(),
                    quantity: line.quantity,
                    unit_price: line.product.unit_price,
                })
                .collect(),
            shipping_address: Some(shipping_label),
            payment_method: Some(payment_label),
        };

        cart.clear();
        self.step = CheckoutStep::Confirmation;
        info!(order = %order.id, total = %order.total, "order placed");

        let confirmation = OrderConfirmation {
            order,
            summary,
            receipt,
        };
        self.confirmation = Some(confirmation.clone());
        Ok(confirmation)
    }
}
