use super::CheckoutEngine;
use crate::domain::cart::Cart;
use crate::domain::order::Order;
use crate::domain::payment::IntentMetadata;
use crate::error::{CheckoutError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

/// What the client needs to complete a payment: the provider's client secret
/// plus the ids to track the attempt.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub client_secret: String,
    pub order_id: String,
    pub payment_intent_id: String,
}

impl CheckoutEngine {
    /// Turns a non-empty cart into a pending order plus a payment intent.
    ///
    /// A retried call with an unchanged cart resumes the existing pending
    /// order (same checkout key) rather than creating a duplicate, so a retry
    /// can never double-charge. If the gateway call fails the order stays
    /// pending with no intent id: a recoverable, inspectable state that the
    /// next retry picks up, never silently rolled back.
    pub async fn start_checkout(&self, session_id: &str) -> Result<CheckoutReceipt> {
        let cart = self
            .carts
            .get(session_id)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or(CheckoutError::EmptyCart)?;

        let key = checkout_key(session_id, &cart);
        if let Some(order) = self.orders.find_pending_checkout(session_id, &key).await? {
            if let Some(intent_id) = order.payment_intent_id.clone() {
                let snapshot = self.gateway.retrieve_intent(&intent_id).await?;
                info!(order_id = %order.id, %intent_id, "resuming pending checkout");
                return Ok(CheckoutReceipt {
                    client_secret: snapshot.client_secret,
                    order_id: order.id,
                    payment_intent_id: intent_id,
                });
            }
            // A previous attempt died before the intent id landed; attach a
            // fresh intent to the same order.
            return self.attach_intent(order).await;
        }

        let order = Order::from_cart(&cart, key);
        self.orders.insert(order.clone()).await?;
        self.attach_intent(order).await
    }

    async fn attach_intent(&self, mut order: Order) -> Result<CheckoutReceipt> {
        let amount = minor_units(order.total_price)?;
        let metadata = IntentMetadata {
            order_id: order.id.clone(),
            session_id: order.session_id.clone(),
        };
        let created = self
            .gateway
            .create_intent(amount, &self.config.currency, metadata)
            .await?;

        order.payment_intent_id = Some(created.intent_id.clone());
        self.orders.update(order.clone()).await?;

        info!(order_id = %order.id, intent_id = %created.intent_id, "payment intent created");
        Ok(CheckoutReceipt {
            client_secret: created.client_secret,
            order_id: order.id,
            payment_intent_id: created.intent_id,
        })
    }

    /// Orders for a session, most recent first.
    pub async fn orders_for_session(&self, session_id: &str) -> Result<Vec<Order>> {
        self.orders.find_by_session(session_id).await
    }

    /// A single order by id.
    pub async fn order(&self, order_id: &str) -> Result<Order> {
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.to_string()))
    }

    /// Every order in the store.
    pub async fn all_orders(&self) -> Result<Vec<Order>> {
        self.orders.all().await
    }
}

/// Converts a price into minor currency units: `round(total * 100)`.
fn minor_units(total: Decimal) -> Result<i64> {
    (total * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| {
            CheckoutError::Internal(Box::new(std::io::Error::other(
                "total exceeds representable minor units",
            )))
        })
}

/// Fingerprint of a session and its cart snapshot. Two checkout calls with
/// the same session and an unchanged cart produce the same key.
fn checkout_key(session_id: &str, cart: &Cart) -> String {
    let mut hasher = Sha256::new();
    hasher.update(session_id.as_bytes());
    for item in &cart.items {
        hasher.update([0u8]);
        hasher.update(item.product_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(item.unit_price.to_string().as_bytes());
        hasher.update(item.quantity.to_le_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckoutConfig;
    use crate::domain::order::OrderStatus;
    use crate::domain::product::Product;
    use crate::infrastructure::gateway_sim::SimulatedGateway;
    use crate::infrastructure::in_memory::{
        InMemoryCartStore, InMemoryCatalog, InMemoryOrderStore,
    };
    use rust_decimal_macros::dec;

    fn engine_with_gateway(gateway: SimulatedGateway) -> CheckoutEngine {
        let catalog = InMemoryCatalog::with_products(vec![Product {
            id: "p1".to_string(),
            name: "Smart Watch".to_string(),
            price: dec!(100),
            description: String::new(),
            image: "watch.jpg".to_string(),
            quantity: 30,
        }]);
        CheckoutEngine::new(
            Box::new(InMemoryCartStore::new()),
            Box::new(InMemoryOrderStore::new()),
            Box::new(catalog),
            Box::new(gateway),
            CheckoutConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_checkout_creates_pending_order_with_intent() {
        let gateway = SimulatedGateway::new();
        let engine = engine_with_gateway(gateway.clone());

        engine.add_item("s1", "p1", Some(2)).await.unwrap();
        let receipt = engine.start_checkout("s1").await.unwrap();

        let order = engine.order(&receipt.order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_price, dec!(200));
        assert_eq!(
            order.payment_intent_id.as_deref(),
            Some(receipt.payment_intent_id.as_str())
        );

        // The intent was created for round(total * 100) minor units.
        assert_eq!(gateway.amount_of(&receipt.payment_intent_id), Some(20000));

        // The cart is untouched until payment is confirmed.
        let cart = engine.get_cart("s1").await.unwrap();
        assert_eq!(cart.items.len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_on_empty_cart() {
        let engine = engine_with_gateway(SimulatedGateway::new());
        let result = engine.start_checkout("s1").await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert!(engine.all_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_retry_resumes_same_order() {
        let engine = engine_with_gateway(SimulatedGateway::new());
        engine.add_item("s1", "p1", Some(1)).await.unwrap();

        let first = engine.start_checkout("s1").await.unwrap();
        let second = engine.start_checkout("s1").await.unwrap();

        assert_eq!(first.order_id, second.order_id);
        assert_eq!(first.payment_intent_id, second.payment_intent_id);
        assert_eq!(first.client_secret, second.client_secret);
        assert_eq!(engine.all_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_with_changed_cart_creates_new_order() {
        let engine = engine_with_gateway(SimulatedGateway::new());
        engine.add_item("s1", "p1", Some(1)).await.unwrap();
        let first = engine.start_checkout("s1").await.unwrap();

        engine.add_item("s1", "p1", Some(1)).await.unwrap();
        let second = engine.start_checkout("s1").await.unwrap();

        assert_ne!(first.order_id, second.order_id);
        assert_eq!(engine.all_orders().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_gateway_failure_leaves_pending_order_for_retry() {
        let gateway = SimulatedGateway::new();
        gateway.fail_next_create();
        let engine = engine_with_gateway(gateway.clone());

        engine.add_item("s1", "p1", Some(1)).await.unwrap();
        let result = engine.start_checkout("s1").await;
        assert!(matches!(result, Err(CheckoutError::Gateway(_))));

        // The order exists, pending, with no intent id: inspectable, not
        // rolled back.
        let orders = engine.orders_for_session("s1").await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Pending);
        assert!(orders[0].payment_intent_id.is_none());

        // The retry resumes that order instead of duplicating it.
        let receipt = engine.start_checkout("s1").await.unwrap();
        assert_eq!(receipt.order_id, orders[0].id);
        assert_eq!(engine.all_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_orders_for_session_most_recent_first() {
        let engine = engine_with_gateway(SimulatedGateway::new());
        engine.add_item("s1", "p1", Some(1)).await.unwrap();
        let first = engine.start_checkout("s1").await.unwrap();
        engine.add_item("s1", "p1", Some(1)).await.unwrap();
        let second = engine.start_checkout("s1").await.unwrap();

        let orders = engine.orders_for_session("s1").await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, second.order_id);
        assert_eq!(orders[1].id, first.order_id);
    }

    #[tokio::test]
    async fn test_order_lookup_miss() {
        let engine = engine_with_gateway(SimulatedGateway::new());
        let result = engine.order("nope").await;
        assert!(matches!(result, Err(CheckoutError::OrderNotFound(_))));
    }

    #[test]
    fn test_minor_units_rounding() {
        assert_eq!(minor_units(dec!(200)).unwrap(), 20000);
        assert_eq!(minor_units(dec!(24.99)).unwrap(), 2499);
        assert_eq!(minor_units(dec!(0.005)).unwrap(), 1);
    }

    #[test]
    fn test_checkout_key_tracks_cart_contents() {
        let mut cart = Cart::new("s1");
        let product = Product {
            id: "p1".to_string(),
            name: "Widget".to_string(),
            price: dec!(10),
            description: String::new(),
            image: "w.jpg".to_string(),
            quantity: 5,
        };
        cart.add(&product, 1);
        let key1 = checkout_key("s1", &cart);
        assert_eq!(key1, checkout_key("s1", &cart));

        cart.add(&product, 1);
        assert_ne!(key1, checkout_key("s1", &cart));
        assert_ne!(key1, checkout_key("s2", &cart));
    }
}
