//! Field values stored per task.

use super::TaskId;
use crate::schema::domain::FieldId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Validated value of one field on one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    task_id: TaskId,
    field_id: FieldId,
    value: Value,
}

impl FieldValue {
    /// Pairs a validated value with its task and field.
    #[must_use]
    pub const fn new(task_id: TaskId, field_id: FieldId, value: Value) -> Self {
        Self {
            task_id,
            field_id,
            value,
        }
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the field.
    #[must_use]
    pub const fn field_id(&self) -> FieldId {
        self.field_id
    }

    /// Returns the JSON value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Consumes the field value, returning the JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }
}
