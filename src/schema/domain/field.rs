//! Field types, fields, and screens (field layouts).

use super::{FieldId, FieldTypeId, SchemaDomainError, ScreenId, name::validated_name};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of value a field stores, described by JSON Schema documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldType {
    id: FieldTypeId,
    key: String,
    config_schema: Option<Value>,
    value_schema: Value,
}

impl FieldType {
    /// Creates a field type with the schema its values must satisfy.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDomainError::EmptyName`] when the key is blank.
    pub fn new(key: impl Into<String>, value_schema: Value) -> Result<Self, SchemaDomainError> {
        Ok(Self {
            id: FieldTypeId::new(),
            key: validated_name("field type", key)?,
            config_schema: None,
            value_schema,
        })
    }

    /// Sets the schema that field configs of this type must satisfy.
    #[must_use]
    pub fn with_config_schema(mut self, config_schema: Value) -> Self {
        self.config_schema = Some(config_schema);
        self
    }

    /// Returns the field type identifier.
    #[must_use]
    pub const fn id(&self) -> FieldTypeId {
        self.id
    }

    /// Returns the field type key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the config schema, if the type is configurable.
    #[must_use]
    pub const fn config_schema(&self) -> Option<&Value> {
        self.config_schema.as_ref()
    }

    /// Returns the value schema.
    #[must_use]
    pub const fn value_schema(&self) -> &Value {
        &self.value_schema
    }
}

/// A named field definition bound to a field type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    id: FieldId,
    key: String,
    name: String,
    description: Option<String>,
    config: Option<Value>,
    field_type: FieldType,
}

impl Field {
    /// Creates a field of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDomainError::EmptyName`] when the key or name is blank.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        field_type: FieldType,
    ) -> Result<Self, SchemaDomainError> {
        Ok(Self {
            id: FieldId::new(),
            key: validated_name("field key", key)?,
            name: validated_name("field", name)?,
            description: None,
            config: None,
            field_type,
        })
    }

    /// Sets the field description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the field config.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    /// Returns the field identifier.
    #[must_use]
    pub const fn id(&self) -> FieldId {
        self.id
    }

    /// Returns the unique field key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the config, if any.
    #[must_use]
    pub const fn config(&self) -> Option<&Value> {
        self.config.as_ref()
    }

    /// Returns the field type.
    #[must_use]
    pub const fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Returns the short form recorded in field-update events.
    #[must_use]
    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            id: self.id,
            key: self.key.clone(),
            name: self.name.clone(),
        }
    }
}

/// Short field description recorded in events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    /// Field identifier.
    pub id: FieldId,
    /// Field key at capture time.
    pub key: String,
    /// Field name at capture time.
    pub name: String,
}

/// Placement of a field on a screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenField {
    field: Field,
    is_required: bool,
    priority: i32,
}

impl ScreenField {
    /// Places a field on a screen.
    #[must_use]
    pub const fn new(field: Field, is_required: bool, priority: i32) -> Self {
        Self {
            field,
            is_required,
            priority,
        }
    }

    /// Returns the placed field.
    #[must_use]
    pub const fn field(&self) -> &Field {
        &self.field
    }

    /// Returns `true` when tasks must always carry a value for the field.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.is_required
    }

    /// Returns the display priority (ascending).
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }
}

/// Field layout bound to a project schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    id: ScreenId,
    name: String,
    description: Option<String>,
    fields: Vec<ScreenField>,
}

impl Screen {
    /// Creates a screen. Fields are kept ordered by ascending priority.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDomainError::EmptyName`] when the name is blank.
    pub fn new(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = ScreenField>,
    ) -> Result<Self, SchemaDomainError> {
        let mut ordered: Vec<ScreenField> = fields.into_iter().collect();
        ordered.sort_by_key(ScreenField::priority);
        Ok(Self {
            id: ScreenId::new(),
            name: validated_name("screen", name)?,
            description: None,
            fields: ordered,
        })
    }

    /// Sets the screen description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the screen identifier.
    #[must_use]
    pub const fn id(&self) -> ScreenId {
        self.id
    }

    /// Returns the screen name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the placed fields in display order.
    #[must_use]
    pub fn fields(&self) -> &[ScreenField] {
        &self.fields
    }

    /// Returns the placement of `field_id`, if the field is on this screen.
    #[must_use]
    pub fn find_field(&self, field_id: FieldId) -> Option<&ScreenField> {
        self.fields
            .iter()
            .find(|placement| placement.field.id == field_id)
    }

    /// Returns the fields every task must carry a value for.
    pub fn required_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(|placement| placement.is_required)
            .map(|placement| &placement.field)
    }
}
