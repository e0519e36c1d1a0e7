//! Read models returned by task services.

use crate::schema::domain::{FieldSnapshot, StatusId, StatusSnapshot, Transition, TransitionId};
use crate::task::domain::{Link, Task, TaskId, TaskKey};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// A task with its status, screen fields and links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSnapshot {
    /// The task.
    pub task: Task,
    /// Current status with its type.
    pub status: StatusSnapshot,
    /// One entry per screen field, in screen order.
    pub fields: Vec<FieldValueSnapshot>,
    /// Links where the task is the source.
    pub outward_links: Vec<Link>,
    /// Links where the task is the destination.
    pub inward_links: Vec<Link>,
}

impl TaskSnapshot {
    /// Returns the value of the field with `key`, if set.
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|entry| entry.field.key == key)
            .and_then(|entry| entry.value.as_ref())
    }
}

/// A screen field and the task's value for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValueSnapshot {
    /// The field.
    pub field: FieldSnapshot,
    /// Whether the screen requires a value.
    pub is_required: bool,
    /// Current value, `None` when unset.
    pub value: Option<Value>,
}

/// Compact task listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    /// Task identifier.
    pub id: TaskId,
    /// Task key.
    pub key: TaskKey,
    /// Summary text.
    pub summary: String,
    /// Current status.
    pub status: StatusSnapshot,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Transition as offered to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionSummary {
    /// Transition identifier.
    pub id: TransitionId,
    /// Transition name.
    pub name: String,
    /// Source status, `None` for "any status".
    pub src_status: Option<StatusId>,
    /// Destination status.
    pub dest_status: StatusId,
}

impl From<&Transition> for TransitionSummary {
    fn from(transition: &Transition) -> Self {
        Self {
            id: transition.id(),
            name: transition.name().to_owned(),
            src_status: transition.src_status(),
            dest_status: transition.dest_status(),
        }
    }
}
