use crate::domain::order::{BillingDetails, Order, OrderId, OrderStatus};
use crate::error::{GatewayError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One flat CSV row describing an order. Billing columns may be omitted.
#[derive(Debug, Deserialize)]
struct OrderRecord {
    id: OrderId,
    order_key: String,
    #[serde(default)]
    status: Option<OrderStatus>,
    total: Decimal,
    #[serde(default)]
    virtual_only: Option<bool>,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    address_1: String,
    #[serde(default)]
    address_2: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    postcode: String,
    #[serde(default)]
    company: String,
}

impl From<OrderRecord> for Order {
    fn from(record: OrderRecord) -> Self {
        Order {
            id: record.id,
            order_key: record.order_key,
            status: record.status.unwrap_or_default(),
            total: record.total,
            billing: BillingDetails {
                first_name: record.first_name,
                last_name: record.last_name,
                email: record.email,
                phone: record.phone,
                address_1: record.address_1,
                address_2: record.address_2,
                city: record.city,
                state: record.state,
                country: record.country,
                postcode: record.postcode,
                company: record.company,
            },
            virtual_only: record.virtual_only.unwrap_or(false),
            notes: Vec::new(),
        }
    }
}

/// Reads orders from a CSV source.
///
/// Whitespace is trimmed and rows may stop after any optional column.
pub struct OrderReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OrderReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes orders.
    pub fn orders(self) -> impl Iterator<Item = Result<Order>> {
        self.reader
            .into_deserialize::<OrderRecord>()
            .map(|result| result.map(Order::from).map_err(GatewayError::from))
    }
}
