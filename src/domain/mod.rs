//! Domain types and ports. Nothing in here performs I/O.

pub mod decision;
pub mod fields;
pub mod order;
pub mod ports;
pub mod reason;
pub mod signature;
