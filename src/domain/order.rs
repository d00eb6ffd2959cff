use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type OrderId = u64;

/// Lifecycle status of a storefront order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    OnHold,
    Failed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::OnHold => "on-hold",
            OrderStatus::Failed => "failed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    /// Paid orders are never moved by a processor response again.
    pub fn is_paid(&self) -> bool {
        matches!(self, OrderStatus::Processing | OrderStatus::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "completed" => Ok(OrderStatus::Completed),
            "on-hold" => Ok(OrderStatus::OnHold),
            "failed" => Ok(OrderStatus::Failed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "refunded" => Ok(OrderStatus::Refunded),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Billing details captured at checkout.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(default)]
pub struct BillingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postcode: String,
    pub company: String,
}

/// A storefront order as seen by the gateway.
///
/// The gateway never creates or deletes orders. It reads the status, asks the store for
/// status transitions, and appends notes.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub id: OrderId,
    /// Opaque per-order key issued by the storefront.
    pub order_key: String,
    pub status: OrderStatus,
    pub total: Decimal,
    #[serde(default)]
    pub billing: BillingDetails,
    /// Whether every line item is virtual (no shipping needed).
    #[serde(default)]
    pub virtual_only: bool,
    /// Append-only audit trail.
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Order {
    pub fn new(id: OrderId, order_key: impl Into<String>, total: Decimal) -> Self {
        Self {
            id,
            order_key: order_key.into(),
            status: OrderStatus::Pending,
            total,
            billing: BillingDetails::default(),
            virtual_only: false,
            notes: Vec::new(),
        }
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}
