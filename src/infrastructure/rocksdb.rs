use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::domain::ports::{OrderStore, Transition};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing orders.
pub const CF_ORDERS: &str = "orders";

/// A persistent order store implementation using RocksDB.
///
/// Orders are stored as JSON under their big-endian id. Every read-modify-write runs under a
/// store-wide mutex, which gives single-process atomicity for conditional transitions.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>` and the mutex).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "orders" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn read(&self, order_id: OrderId) -> Result<Option<Order>> {
        let cf = self.orders_cf()?;
        match self.db.get_cf(cf, order_id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, order: &Order) -> Result<()> {
        let cf = self.orders_cf()?;
        let value = serde_json::to_vec(order)?;
        self.db.put_cf(cf, order.id.to_be_bytes(), value)?;
        Ok(())
    }

    fn orders_cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_ORDERS).ok_or_else(|| {
            GatewayError::InternalError(Box::new(std::io::Error::other(
                "Orders column family not found",
            )))
        })
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn store(&self, order: Order) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(&order)
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        self.read(order_id)
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        let cf = self.orders_cf()?;

        let mut orders: Vec<Order> = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            orders.push(serde_json::from_slice(&value)?);
        }

        Ok(orders)
    }

    async fn add_note(&self, order_id: OrderId, note: String) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut order = self
            .read(order_id)?
            .ok_or(GatewayError::OrderNotFound(order_id))?;
        order.add_note(note);
        self.write(&order)
    }

    async fn compare_and_transition(
        &self,
        order_id: OrderId,
        expected: OrderStatus,
        to: OrderStatus,
        note: String,
    ) -> Result<Transition> {
        let _guard = self.write_lock.lock().await;
        let mut order = self
            .read(order_id)?
            .ok_or(GatewayError::OrderNotFound(order_id))?;
        if order.status != expected {
            return Ok(Transition::Conflict(order.status));
        }
        order.status = to;
        order.add_note(note);
        self.write(&order)?;
        Ok(Transition::Applied)
    }
}
