//! In-memory schema registry adapter.

mod registry;

pub use registry::InMemorySchemaRegistry;
