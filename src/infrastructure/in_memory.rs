use crate::domain::cart::Cart;
use crate::domain::order::{Order, OrderStatus, TransitionOutcome};
use crate::domain::ports::{CartStore, OrderStore, ProductCatalog};
use crate::domain::product::Product;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for session carts.
///
/// Uses `Arc<RwLock<HashMap>>` to allow shared concurrent access across
/// sessions. Ideal for testing and for the CLI harness.
#[derive(Default, Clone)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<String, Cart>>>,
}

impl InMemoryCartStore {
    /// Creates a new, empty in-memory cart store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn get(&self, session_id: &str) -> Result<Option<Cart>> {
        let carts = self.carts.read().await;
        Ok(carts.get(session_id).cloned())
    }

    async fn put(&self, cart: Cart) -> Result<()> {
        let mut carts = self.carts.write().await;
        carts.insert(cart.session_id.clone(), cart);
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let mut carts = self.carts.write().await;
        carts.remove(session_id);
        Ok(())
    }
}

/// A thread-safe in-memory store for orders.
///
/// Keeps insertion order so `all` is deterministic. The reconciliation
/// transition holds the write lock across lookup and mutation, giving the
/// compare-and-set semantics the triggers rely on.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<OrderMap>>,
}

#[derive(Default)]
struct OrderMap {
    orders: HashMap<String, Order>,
    insertion: Vec<String>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.insertion.push(order.id.clone());
        inner.orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn update(&self, order: Order) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner.orders.get(order_id).cloned())
    }

    async fn find_by_intent(&self, intent_id: &str) -> Result<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .values()
            .find(|order| order.payment_intent_id.as_deref() == Some(intent_id))
            .cloned())
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|order| order.session_id == session_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn find_pending_checkout(
        &self,
        session_id: &str,
        checkout_key: &str,
    ) -> Result<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .values()
            .find(|order| {
                order.session_id == session_id
                    && order.status == OrderStatus::Pending
                    && order.checkout_key == checkout_key
            })
            .cloned())
    }

    async fn transition_by_intent(
        &self,
        intent_id: &str,
        next: OrderStatus,
    ) -> Result<Option<TransitionOutcome>> {
        let mut inner = self.inner.write().await;
        let Some(order) = inner
            .orders
            .values_mut()
            .find(|order| order.payment_intent_id.as_deref() == Some(intent_id))
        else {
            return Ok(None);
        };

        if order.settle(next) {
            Ok(Some(TransitionOutcome::Applied(order.clone())))
        } else {
            Ok(Some(TransitionOutcome::AlreadyTerminal(order.clone())))
        }
    }

    async fn all(&self) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        Ok(inner
            .insertion
            .iter()
            .filter_map(|id| inner.orders.get(id).cloned())
            .collect())
    }
}

/// An in-memory product catalog, seeded up front.
#[derive(Default, Clone)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<String, Product>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let map = products
            .into_iter()
            .map(|product| (product.id.clone(), product))
            .collect();
        Self {
            products: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn get(&self, product_id: &str) -> Result<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(product_id).cloned())
    }

    async fn all(&self) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cart(session_id: &str) -> Cart {
        let mut cart = Cart::new(session_id);
        cart.add(
            &Product {
                id: "p1".to_string(),
                name: "Phone Case".to_string(),
                price: dec!(599),
                description: String::new(),
                image: "case.jpg".to_string(),
                quantity: 80,
            },
            1,
        );
        cart
    }

    fn order(session_id: &str, intent_id: Option<&str>) -> Order {
        let mut order = Order::from_cart(&cart(session_id), format!("key-{session_id}"));
        order.payment_intent_id = intent_id.map(str::to_string);
        order
    }

    #[tokio::test]
    async fn test_cart_store_roundtrip() {
        let store = InMemoryCartStore::new();
        let cart = cart("s1");

        store.put(cart.clone()).await.unwrap();
        assert_eq!(store.get("s1").await.unwrap(), Some(cart));

        store.delete("s1").await.unwrap();
        assert!(store.get("s1").await.unwrap().is_none());

        // Deleting a missing cart is not an error.
        store.delete("s1").await.unwrap();
    }

    #[tokio::test]
    async fn test_order_store_find_by_intent() {
        let store = InMemoryOrderStore::new();
        let order = order("s1", Some("pi_1"));
        store.insert(order.clone()).await.unwrap();

        let found = store.find_by_intent("pi_1").await.unwrap().unwrap();
        assert_eq!(found.id, order.id);
        assert!(store.find_by_intent("pi_2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_set() {
        let store = InMemoryOrderStore::new();
        store.insert(order("s1", Some("pi_1"))).await.unwrap();

        let first = store
            .transition_by_intent("pi_1", OrderStatus::Completed)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(first, TransitionOutcome::Applied(_)));

        // The stale failure after completion does not apply.
        let second = store
            .transition_by_intent("pi_1", OrderStatus::Failed)
            .await
            .unwrap()
            .unwrap();
        match second {
            TransitionOutcome::AlreadyTerminal(order) => {
                assert_eq!(order.status, OrderStatus::Completed);
            }
            TransitionOutcome::Applied(_) => panic!("terminal order was re-settled"),
        }

        // Unknown intent reports a lookup miss.
        assert!(store
            .transition_by_intent("pi_2", OrderStatus::Failed)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_find_pending_checkout_skips_settled_orders() {
        let store = InMemoryOrderStore::new();
        let mut settled = order("s1", Some("pi_1"));
        settled.settle(OrderStatus::Completed);
        let key = settled.checkout_key.clone();
        store.insert(settled).await.unwrap();

        assert!(store
            .find_pending_checkout("s1", &key)
            .await
            .unwrap()
            .is_none());

        let pending = order("s1", None);
        store.insert(pending.clone()).await.unwrap();
        let found = store
            .find_pending_checkout("s1", &pending.checkout_key)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, pending.id);
    }

    #[tokio::test]
    async fn test_all_preserves_insertion_order() {
        let store = InMemoryOrderStore::new();
        let first = order("s1", None);
        let second = order("s2", None);
        store.insert(first.clone()).await.unwrap();
        store.insert(second.clone()).await.unwrap();

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[1].id, second.id);
    }

    #[tokio::test]
    async fn test_catalog_lookup() {
        let catalog = InMemoryCatalog::with_products(vec![Product {
            id: "p1".to_string(),
            name: "Screen Protector".to_string(),
            price: dec!(299),
            description: String::new(),
            image: "protector.jpg".to_string(),
            quantity: 120,
        }]);

        assert!(catalog.get("p1").await.unwrap().is_some());
        assert!(catalog.get("p2").await.unwrap().is_none());
        assert_eq!(catalog.all().await.unwrap().len(), 1);
    }
}
