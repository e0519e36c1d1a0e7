//! Application services for the schema registry.

mod error;
mod lookup;
mod registry;

pub use error::{SchemaServiceError, SchemaServiceResult};
pub use lookup::SchemaLookup;
pub use registry::{
    DefineFieldRequest, DefineProjectSchemaRequest, DefineTransitionRequest,
    SchemaRegistryService, ScreenFieldRequest,
};
