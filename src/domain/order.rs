use crate::domain::cart::{Cart, CartItem};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order lifecycle status.
///
/// `Pending` is the only non-terminal state. Once an order reaches a terminal
/// state no further transition is permitted.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// Result of attempting a terminal transition on an order.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The order was pending and has now settled into the requested state.
    Applied(Order),
    /// The order had already settled; nothing changed.
    AlreadyTerminal(Order),
}

impl TransitionOutcome {
    pub fn order(&self) -> &Order {
        match self {
            TransitionOutcome::Applied(order) | TransitionOutcome::AlreadyTerminal(order) => order,
        }
    }
}

/// An order: the immutable snapshot of a cart at checkout time, plus the
/// status driven by payment reconciliation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub session_id: String,
    pub items: Vec<CartItem>,
    pub total_price: Decimal,
    pub status: OrderStatus,
    /// Sole correlation key for reconciliation; absent until the gateway call
    /// succeeds.
    pub payment_intent_id: Option<String>,
    /// Fingerprint of the session and cart snapshot; a retried checkout with
    /// an unchanged cart resumes the pending order carrying the same key.
    pub checkout_key: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Snapshots a cart into a new pending order with no payment intent yet.
    pub fn from_cart(cart: &Cart, checkout_key: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: cart.session_id.clone(),
            items: cart.items.clone(),
            total_price: cart.total_price,
            status: OrderStatus::Pending,
            payment_intent_id: None,
            checkout_key,
            customer_name: None,
            customer_email: None,
            created_at: Utc::now(),
        }
    }

    /// Compare-and-set transition into a terminal state.
    ///
    /// Applies only when the order is still pending; a settled order is left
    /// untouched so a stale failure event can never revert a completed order.
    /// Returns `true` if the transition was applied.
    pub fn settle(&mut self, next: OrderStatus) -> bool {
        if !next.is_terminal() || self.status.is_terminal() {
            return false;
        }
        self.status = next;
        true
    }
}
