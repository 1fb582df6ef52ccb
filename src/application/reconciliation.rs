use super::CheckoutEngine;
use crate::domain::event::PaymentEvent;
use crate::domain::order::{Order, OrderStatus, TransitionOutcome};
use crate::domain::payment::PaymentIntentStatus;
use crate::error::{CheckoutError, Result};
use tracing::{info, warn};

impl CheckoutEngine {
    /// Trigger A: the client reports "I just paid".
    ///
    /// The claim is never trusted on its own; the intent is re-fetched from
    /// the gateway first. On the first successful completion the customer
    /// fields are backfilled and the session's cart is deleted. A repeat
    /// confirmation for an already-settled order is a no-op that returns the
    /// order as-is.
    pub async fn confirm_payment(
        &self,
        intent_id: &str,
        customer_name: Option<String>,
        customer_email: Option<String>,
    ) -> Result<Order> {
        let snapshot = self.gateway.retrieve_intent(intent_id).await?;
        if snapshot.status != PaymentIntentStatus::Succeeded {
            return Err(CheckoutError::PaymentNotConfirmed);
        }

        match self
            .orders
            .transition_by_intent(intent_id, OrderStatus::Completed)
            .await?
        {
            None => {
                warn!(intent_id, "confirmation for an intent with no matching order");
                Err(CheckoutError::PaymentNotConfirmed)
            }
            Some(TransitionOutcome::Applied(mut order)) => {
                if customer_name.is_some() {
                    order.customer_name = customer_name;
                }
                if customer_email.is_some() {
                    order.customer_email = customer_email;
                }
                self.orders.update(order.clone()).await?;

                // Cart cleanup is a side effect of the first successful
                // completion only.
                self.carts.delete(&order.session_id).await?;

                info!(order_id = %order.id, intent_id, "payment confirmed, order completed");
                Ok(order)
            }
            Some(TransitionOutcome::AlreadyTerminal(order)) => {
                info!(
                    order_id = %order.id,
                    status = order.status.as_str(),
                    "order already settled, confirmation is a no-op"
                );
                Ok(order)
            }
        }
    }

    /// Trigger B: a signature-verified provider event.
    ///
    /// Terminal outcomes are applied idempotently; duplicate and unmatched
    /// events are logged and absorbed because the webhook contract only
    /// requires acknowledging receipt.
    pub async fn apply_event(&self, event: PaymentEvent) -> Result<()> {
        match event {
            PaymentEvent::IntentSucceeded { intent_id } => {
                self.settle_from_event(&intent_id, OrderStatus::Completed)
                    .await
            }
            PaymentEvent::IntentFailed { intent_id } => {
                self.settle_from_event(&intent_id, OrderStatus::Failed).await
            }
            PaymentEvent::ChargeRefunded {
                charge_id,
                intent_id,
            } => {
                info!(charge_id, intent_id, "charge refunded");
                self.settle_from_event(&intent_id, OrderStatus::Cancelled)
                    .await
            }
            PaymentEvent::Unrecognized { kind } => {
                info!(kind, "unhandled event type");
                Ok(())
            }
        }
    }

    async fn settle_from_event(&self, intent_id: &str, next: OrderStatus) -> Result<()> {
        match self.orders.transition_by_intent(intent_id, next).await? {
            None => {
                // The gateway remains the durable source of truth; an
                // unmatched event is dropped, never retried.
                warn!(intent_id, "no order matches payment intent, dropping event");
            }
            Some(TransitionOutcome::Applied(order)) => {
                info!(
                    order_id = %order.id,
                    status = next.as_str(),
                    "order settled from provider event"
                );
            }
            Some(TransitionOutcome::AlreadyTerminal(order)) => {
                info!(
                    order_id = %order.id,
                    status = order.status.as_str(),
                    "duplicate event for settled order, no-op"
                );
            }
        }
        Ok(())
    }
}
