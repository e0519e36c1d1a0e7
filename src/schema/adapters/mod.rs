//! Adapter implementations of the schema registry port.

pub mod memory;
