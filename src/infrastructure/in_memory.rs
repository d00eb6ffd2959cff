use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::domain::ports::{OrderStore, Transition};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for orders.
///
/// Uses `Arc<RwLock<HashMap<OrderId, Order>>>` to allow shared concurrent access. Conditional
/// transitions run entirely under the write guard, so two callers can never both win.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn store(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&order_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        all.sort_by_key(|order| order.id);
        Ok(all)
    }

    async fn add_note(&self, order_id: OrderId, note: String) -> Result<()> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or(GatewayError::OrderNotFound(order_id))?;
        order.add_note(note);
        Ok(())
    }

    async fn compare_and_transition(
        &self,
        order_id: OrderId,
        expected: OrderStatus,
        to: OrderStatus,
        note: String,
    ) -> Result<Transition> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or(GatewayError::OrderNotFound(order_id))?;
        if order.status != expected {
            return Ok(Transition::Conflict(order.status));
        }
        order.status = to;
        order.add_note(note);
        Ok(Transition::Applied)
    }
}
