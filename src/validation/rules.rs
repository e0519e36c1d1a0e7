//! Validation rules backed by JSON Schema.
//!
//! Each rule is a pure function. Schemas are compiled per call.

use crate::schema::domain::{EXTENSION_SPECS_JSON_SCHEMA, ExtensionSpec, Field, FieldType};
use crate::validation::{SchemaViolation, ValidationResult};
use serde_json::Value;

/// Compiles `schema` and returns every message produced for `instance`,
/// joined with `"; "`, or `None` when the instance is valid.
fn violations(schema: &Value, instance: &Value) -> Result<Option<String>, String> {
    let validator = jsonschema::validator_for(schema).map_err(|err| err.to_string())?;
    let messages: Vec<String> = validator
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if messages.is_empty() {
        Ok(None)
    } else {
        Ok(Some(messages.join("; ")))
    }
}

/// Checks that `document` compiles as a JSON Schema.
///
/// # Errors
///
/// Returns [`SchemaViolation::InvalidSchemaDocument`] when it does not.
pub fn ensure_schema_document(owner: &str, document: &Value) -> ValidationResult<()> {
    jsonschema::validator_for(document)
        .map(|_| ())
        .map_err(|err| SchemaViolation::InvalidSchemaDocument {
            owner: owner.to_owned(),
            detail: err.to_string(),
        })
}

/// Validates a field config against its field type's config schema.
///
/// Types without a config schema accept any config. A missing config is
/// checked as JSON `null`.
///
/// # Errors
///
/// Returns [`SchemaViolation::InvalidFieldConfig`] when the config fails the
/// schema and [`SchemaViolation::InvalidSchemaDocument`] when the schema
/// itself is malformed.
pub fn validate_config(
    field_type: &FieldType,
    field_key: &str,
    config: Option<&Value>,
) -> ValidationResult<()> {
    let Some(config_schema) = field_type.config_schema() else {
        return Ok(());
    };
    let null = Value::Null;
    let instance = config.unwrap_or(&null);
    match violations(config_schema, instance) {
        Ok(None) => Ok(()),
        Ok(Some(detail)) => Err(SchemaViolation::InvalidFieldConfig {
            field_key: field_key.to_owned(),
            detail,
        }),
        Err(detail) => Err(SchemaViolation::InvalidSchemaDocument {
            owner: format!("field type '{}'", field_type.key()),
            detail,
        }),
    }
}

/// Validates a field value against the field type's value schema.
///
/// # Errors
///
/// Returns [`SchemaViolation::InvalidFieldValue`] when the value fails the
/// schema and [`SchemaViolation::InvalidSchemaDocument`] when the schema
/// itself is malformed.
pub fn validate_value(field: &Field, value: &Value) -> ValidationResult<()> {
    let field_type = field.field_type();
    match violations(field_type.value_schema(), value) {
        Ok(None) => Ok(()),
        Ok(Some(detail)) => Err(SchemaViolation::InvalidFieldValue {
            field_key: field.key().to_owned(),
            detail,
        }),
        Err(detail) => Err(SchemaViolation::InvalidSchemaDocument {
            owner: format!("field type '{}'", field_type.key()),
            detail,
        }),
    }
}

/// Validates a raw list of extension specs and deserializes it.
///
/// `kind` names the list in error messages (`conditions`, `postfunctions`,
/// `event_listeners`). JSON `null` is accepted as an empty list.
///
/// # Errors
///
/// Returns [`SchemaViolation::InvalidExtensionSpecs`] when the document does
/// not have the fixed shape.
pub fn validate_extension_specs(
    kind: &'static str,
    document: &Value,
) -> ValidationResult<Vec<ExtensionSpec>> {
    if document.is_null() {
        return Ok(Vec::new());
    }
    let invalid = |detail: String| SchemaViolation::InvalidExtensionSpecs { kind, detail };
    let shape: Value =
        serde_json::from_str(EXTENSION_SPECS_JSON_SCHEMA).map_err(|err| invalid(err.to_string()))?;
    if let Some(detail) = violations(&shape, document).map_err(invalid)? {
        return Err(invalid(detail));
    }
    serde_json::from_value(document.clone()).map_err(|err| invalid(err.to_string()))
}
