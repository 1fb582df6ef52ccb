use crate::domain::cart::Cart;
use crate::domain::order::{Order, OrderStatus, TransitionOutcome};
use crate::domain::ports::{CartStore, OrderStore};
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for session carts.
pub const CF_CARTS: &str = "carts";
/// Column Family for orders.
pub const CF_ORDERS: &str = "orders";

/// A persistent store implementation using RocksDB.
///
/// Handles storage for both `Cart` and `Order` entities using separate Column
/// Families, with JSON-encoded values. `Clone` shares the underlying
/// `Arc<DB>`. The reconciliation transition serializes through a mutex so the
/// lookup and the status compare-and-set stay atomic.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    transition_lock: Arc<Mutex<()>>,
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_carts = ColumnFamilyDescriptor::new(CF_CARTS, Options::default());
        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_carts, cf_orders])?;

        Ok(Self {
            db: Arc::new(db),
            transition_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            CheckoutError::Internal(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| CheckoutError::Internal(Box::new(e)))
    }

    fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| CheckoutError::Internal(Box::new(e)))
    }

    fn scan_orders(&self) -> Result<Vec<Order>> {
        let cf = self.cf(CF_ORDERS)?;
        let mut orders = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            orders.push(Self::decode(&value)?);
        }
        Ok(orders)
    }

    fn put_order(&self, order: &Order) -> Result<()> {
        let cf = self.cf(CF_ORDERS)?;
        self.db
            .put_cf(cf, order.id.as_bytes(), Self::encode(order)?)?;
        Ok(())
    }
}

#[async_trait]
impl CartStore for RocksDbStore {
    async fn get(&self, session_id: &str) -> Result<Option<Cart>> {
        let cf = self.cf(CF_CARTS)?;
        match self.db.get_cf(cf, session_id.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, cart: Cart) -> Result<()> {
        let cf = self.cf(CF_CARTS)?;
        self.db
            .put_cf(cf, cart.session_id.as_bytes(), Self::encode(&cart)?)?;
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let cf = self.cf(CF_CARTS)?;
        self.db.delete_cf(cf, session_id.as_bytes())?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for RocksDbStore {
    async fn insert(&self, order: Order) -> Result<()> {
        self.put_order(&order)
    }

    async fn update(&self, order: Order) -> Result<()> {
        self.put_order(&order)
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>> {
        let cf = self.cf(CF_ORDERS)?;
        match self.db.get_cf(cf, order_id.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn find_by_intent(&self, intent_id: &str) -> Result<Option<Order>> {
        Ok(self
            .scan_orders()?
            .into_iter()
            .find(|order| order.payment_intent_id.as_deref() == Some(intent_id)))
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .scan_orders()?
            .into_iter()
            .filter(|order| order.session_id == session_id)
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn find_pending_checkout(
        &self,
        session_id: &str,
        checkout_key: &str,
    ) -> Result<Option<Order>> {
        Ok(self.scan_orders()?.into_iter().find(|order| {
            order.session_id == session_id
                && order.status == OrderStatus::Pending
                && order.checkout_key == checkout_key
        }))
    }

    async fn transition_by_intent(
        &self,
        intent_id: &str,
        next: OrderStatus,
    ) -> Result<Option<TransitionOutcome>> {
        let _guard = self.transition_lock.lock().await;

        let Some(mut order) = self
            .scan_orders()?
            .into_iter()
            .find(|order| order.payment_intent_id.as_deref() == Some(intent_id))
        else {
            return Ok(None);
        };

        if order.settle(next) {
            self.put_order(&order)?;
            Ok(Some(TransitionOutcome::Applied(order)))
        } else {
            Ok(Some(TransitionOutcome::AlreadyTerminal(order)))
        }
    }

    async fn all(&self) -> Result<Vec<Order>> {
        self.scan_orders()
    }
}
