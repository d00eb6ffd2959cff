//! CSV adapters for orders and `name,value` field sets.

pub mod field_reader;
pub mod field_writer;
pub mod order_reader;
pub mod order_writer;
