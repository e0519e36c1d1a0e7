//! Port contracts for the schema registry.

pub mod registry;

pub use registry::{SchemaRegistry, SchemaRegistryError, SchemaRegistryResult};

#[cfg(test)]
pub use registry::MockSchemaRegistry;
