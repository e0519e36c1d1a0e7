//! Diesel row models for task persistence.

use super::schema::{field_values, links, task_events, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Governing project schema.
    pub schema_id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Task type.
    pub task_type_id: uuid::Uuid,
    /// Sequential number within the project.
    pub number: i64,
    /// Task key.
    pub task_key: String,
    /// Summary text.
    pub summary: String,
    /// Current status.
    pub status_id: uuid::Uuid,
    /// Creator.
    pub creator_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Edit revision.
    pub revision: i64,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Governing project schema.
    pub schema_id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Task type.
    pub task_type_id: uuid::Uuid,
    /// Sequential number within the project.
    pub number: i64,
    /// Task key.
    pub task_key: String,
    /// Summary text.
    pub summary: String,
    /// Initial status.
    pub status_id: uuid::Uuid,
    /// Creator.
    pub creator_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Edit revision.
    pub revision: i64,
}

/// Row shape shared by field value reads and writes.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = field_values)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FieldValueRow {
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Field definition.
    pub field_id: uuid::Uuid,
    /// Stored JSON value.
    pub value: Value,
}

/// Query result row for task events.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskEventRow {
    /// Event identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Event kind.
    pub event_type: String,
    /// Field snapshot as JSON.
    pub field: Option<Value>,
    /// Previous value.
    pub old_value: Option<Value>,
    /// New value.
    pub new_value: Option<Value>,
    /// Acting user.
    pub user_id: uuid::Uuid,
    /// Event timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for task events. `seq` is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_events)]
pub struct NewTaskEventRow {
    /// Event identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Event kind.
    pub event_type: String,
    /// Field snapshot as JSON.
    pub field: Option<Value>,
    /// Previous value.
    pub old_value: Option<Value>,
    /// New value.
    pub new_value: Option<Value>,
    /// Acting user.
    pub user_id: uuid::Uuid,
    /// Event timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row shape shared by link reads and writes.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LinkRow {
    /// Link identifier.
    pub id: uuid::Uuid,
    /// Link type.
    pub link_type_id: uuid::Uuid,
    /// Source task.
    pub src_task_id: uuid::Uuid,
    /// Destination task.
    pub dest_task_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
