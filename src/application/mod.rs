//! Application layer orchestrating the gateway's two flows.
//!
//! `RequestBuilder` signs the outbound field set handed to the processor, and
//! `ResponseProcessor` verifies the processor's response and drives the order through its
//! decision state machine.

pub mod processor;
pub mod request;
