use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct OrderRow {
    id: OrderId,
    status: OrderStatus,
    total: Decimal,
    notes: String,
}

/// Writes the final state of orders as CSV. Notes are joined with `" | "`.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_orders(&mut self, orders: Vec<Order>) -> Result<()> {
        for order in &orders {
            self.writer.serialize(OrderRow {
                id: order.id,
                status: order.status,
                total: order.total,
                notes: order.notes.join(" | "),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
