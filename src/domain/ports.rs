use super::order::{Order, OrderId, OrderStatus};
use crate::error::Result;
use async_trait::async_trait;

/// Result of a conditional status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// The order was no longer in the expected status; carries the status actually found.
    Conflict(OrderStatus),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn store(&self, order: Order) -> Result<()>;
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>>;
    async fn get_all(&self) -> Result<Vec<Order>>;
    async fn add_note(&self, order_id: OrderId, note: String) -> Result<()>;

    /// Moves the order to `to` and appends `note`, but only if its status is still `expected`.
    ///
    /// Implementations must perform the check and the write as one atomic step.
    async fn compare_and_transition(
        &self,
        order_id: OrderId,
        expected: OrderStatus,
        to: OrderStatus,
        note: String,
    ) -> Result<Transition>;
}

/// The storefront around the gateway: landing pages and the shopper's cart.
#[async_trait]
pub trait Storefront: Send + Sync {
    /// Post-payment landing page for `order`.
    async fn return_url(&self, order: &Order) -> Result<String>;
    /// Landing page used when no trusted order is available.
    async fn fallback_url(&self) -> Result<String>;
    async fn clear_cart(&self, order: &Order) -> Result<()>;
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type StorefrontBox = Box<dyn Storefront>;
pub type OrderStoreFactory = Box<dyn Fn() -> OrderStoreBox + Send + Sync>;
