//! Request payloads for task services.

use crate::schema::domain::{FieldId, ProjectId, TaskTypeId};
use serde_json::Value;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskRequest {
    pub(super) project_id: ProjectId,
    pub(super) task_type_id: TaskTypeId,
    pub(super) summary: String,
    pub(super) fields: Vec<(FieldId, Value)>,
}

impl CreateTaskRequest {
    /// Creates a request without field values.
    #[must_use]
    pub fn new(project_id: ProjectId, task_type_id: TaskTypeId, summary: impl Into<String>) -> Self {
        Self {
            project_id,
            task_type_id,
            summary: summary.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field value. A later value for the same field replaces an
    /// earlier one.
    #[must_use]
    pub fn with_field(mut self, field_id: FieldId, value: Value) -> Self {
        self.fields.retain(|(existing, _)| *existing != field_id);
        self.fields.push((field_id, value));
        self
    }
}

/// Request payload for editing a task.
///
/// `null` field values clear the field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateTaskRequest {
    pub(super) summary: Option<String>,
    pub(super) fields: Vec<(FieldId, Value)>,
}

impl UpdateTaskRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets or clears a field value. A later value for the same field
    /// replaces an earlier one.
    #[must_use]
    pub fn with_field(mut self, field_id: FieldId, value: Value) -> Self {
        self.fields.retain(|(existing, _)| *existing != field_id);
        self.fields.push((field_id, value));
        self
    }
}
