//! Field value, field config and extension spec validation.
//!
//! Every JSON document the engine stores is checked against a JSON Schema
//! first: field values against their field type's value schema, field
//! configs against the config schema, and extension spec lists against the
//! fixed extension shape. Validation is pure and reports failures as
//! [`SchemaViolation`] values; callers abort the enclosing mutation.

mod error;
pub mod rules;

pub use error::{SchemaViolation, ValidationResult};
pub use rules::{
    ensure_schema_document, validate_config, validate_extension_specs, validate_value,
};

#[cfg(test)]
mod tests;
