//! Validation failure values.

use crate::schema::domain::FieldId;
use thiserror::Error;

/// Result type for validation rules.
pub type ValidationResult<T> = Result<T, SchemaViolation>;

/// A JSON document does not satisfy the schema governing it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaViolation {
    /// A field value fails the field type's value schema.
    #[error("invalid value for field '{field_key}': {detail}")]
    InvalidFieldValue {
        /// Key of the offending field.
        field_key: String,
        /// Validator messages.
        detail: String,
    },

    /// A field config fails the field type's config schema.
    #[error("invalid config for field '{field_key}': {detail}")]
    InvalidFieldConfig {
        /// Key of the offending field.
        field_key: String,
        /// Validator messages.
        detail: String,
    },

    /// A list of extension specs does not have the fixed shape.
    #[error("invalid {kind}: {detail}")]
    InvalidExtensionSpecs {
        /// Which list was rejected, such as `conditions`.
        kind: &'static str,
        /// Validator messages.
        detail: String,
    },

    /// A document meant to be a JSON Schema cannot be compiled.
    #[error("invalid JSON Schema for {owner}: {detail}")]
    InvalidSchemaDocument {
        /// What the schema belongs to.
        owner: String,
        /// Compiler message.
        detail: String,
    },

    /// A required field has no value.
    #[error("field '{field_key}' is required")]
    RequiredFieldMissing {
        /// Key of the missing field.
        field_key: String,
    },

    /// A value was supplied for a field that is not on the task's screen.
    #[error("field {0} is not on the task's screen")]
    UnknownField(FieldId),
}
