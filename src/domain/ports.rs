use crate::domain::cart::Cart;
use crate::domain::order::{Order, OrderStatus, TransitionOutcome};
use crate::domain::payment::{CreatedIntent, IntentMetadata, IntentSnapshot};
use crate::domain::product::Product;
use crate::error::Result;
use async_trait::async_trait;

/// Storage port for session carts.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Result<Option<Cart>>;
    async fn put(&self, cart: Cart) -> Result<()>;
    async fn delete(&self, session_id: &str) -> Result<()>;
}

/// Storage port for orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> Result<()>;
    async fn update(&self, order: Order) -> Result<()>;
    async fn get(&self, order_id: &str) -> Result<Option<Order>>;
    async fn find_by_intent(&self, intent_id: &str) -> Result<Option<Order>>;
    /// Orders for a session, most recent first.
    async fn find_by_session(&self, session_id: &str) -> Result<Vec<Order>>;
    /// The pending order carrying this checkout key, if any. Used to resume a
    /// retried checkout instead of duplicating the order.
    async fn find_pending_checkout(
        &self,
        session_id: &str,
        checkout_key: &str,
    ) -> Result<Option<Order>>;
    /// Atomically settles the order correlated to `intent_id` into a terminal
    /// state. The lookup and the compare-and-set must happen under the same
    /// lock so concurrent triggers cannot revert a settled order.
    /// Returns `None` when no order matches the intent.
    async fn transition_by_intent(
        &self,
        intent_id: &str,
        next: OrderStatus,
    ) -> Result<Option<TransitionOutcome>>;
    async fn all(&self) -> Result<Vec<Order>>;
}

/// Catalog lookup collaborator. Only used to denormalize cart line data at
/// add-time.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn get(&self, product_id: &str) -> Result<Option<Product>>;
    async fn all(&self) -> Result<Vec<Product>>;
}

/// Pass-through port over the external payment provider. No business logic
/// lives behind this trait.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: IntentMetadata,
    ) -> Result<CreatedIntent>;
    async fn retrieve_intent(&self, intent_id: &str) -> Result<IntentSnapshot>;
}

pub type CartStoreBox = Box<dyn CartStore>;
pub type OrderStoreBox = Box<dyn OrderStore>;
pub type ProductCatalogBox = Box<dyn ProductCatalog>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
