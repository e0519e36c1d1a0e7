//! Immutable audit records of task mutations.

use super::{Link, ParseTaskEventTypeError, TaskEventId, TaskId};
use crate::identity::UserId;
use crate::schema::domain::{FieldSnapshot, LinkType, StatusSnapshot};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Kind of change a [`TaskEvent`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskEventType {
    /// The task was created.
    TaskCreated,
    /// A field value changed.
    TaskUpdated,
    /// The summary changed.
    SummaryUpdated,
    /// The status changed through a transition.
    StatusUpdated,
    /// The task became the source of a link.
    LinkCreated,
    /// A link from the task was removed.
    LinkDeleted,
}

impl TaskEventType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskCreated => "TASK_CREATED",
            Self::TaskUpdated => "TASK_UPDATED",
            Self::SummaryUpdated => "SUMMARY_UPDATED",
            Self::StatusUpdated => "STATUS_UPDATED",
            Self::LinkCreated => "LINK_CREATED",
            Self::LinkDeleted => "LINK_DELETED",
        }
    }
}

impl TryFrom<&str> for TaskEventType {
    type Error = ParseTaskEventTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "TASK_CREATED" => Ok(Self::TaskCreated),
            "TASK_UPDATED" => Ok(Self::TaskUpdated),
            "SUMMARY_UPDATED" => Ok(Self::SummaryUpdated),
            "STATUS_UPDATED" => Ok(Self::StatusUpdated),
            "LINK_CREATED" => Ok(Self::LinkCreated),
            "LINK_DELETED" => Ok(Self::LinkDeleted),
            _ => Err(ParseTaskEventTypeError(value.to_owned())),
        }
    }
}

/// Immutable record of one change to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    id: TaskEventId,
    task_id: TaskId,
    event_type: TaskEventType,
    field: Option<FieldSnapshot>,
    old_value: Option<Value>,
    new_value: Option<Value>,
    user_id: UserId,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskEventData {
    /// Persisted event identifier.
    pub id: TaskEventId,
    /// Task the event belongs to.
    pub task_id: TaskId,
    /// Persisted event type.
    pub event_type: TaskEventType,
    /// Field touched by a `TASK_UPDATED` event.
    pub field: Option<FieldSnapshot>,
    /// Value before the change.
    pub old_value: Option<Value>,
    /// Value after the change.
    pub new_value: Option<Value>,
    /// Acting user.
    pub user_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TaskEvent {
    fn record(
        task_id: TaskId,
        event_type: TaskEventType,
        user_id: UserId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: TaskEventId::new(),
            task_id,
            event_type,
            field: None,
            old_value: None,
            new_value: None,
            user_id,
            created_at: clock.utc(),
        }
    }

    /// Records the creation of a task.
    #[must_use]
    pub fn task_created(task_id: TaskId, user_id: UserId, clock: &impl Clock) -> Self {
        Self::record(task_id, TaskEventType::TaskCreated, user_id, clock)
    }

    /// Records a field value change. `None` stands for "no value".
    #[must_use]
    pub fn field_updated(
        task_id: TaskId,
        field: FieldSnapshot,
        change: (Option<Value>, Option<Value>),
        user_id: UserId,
        clock: &impl Clock,
    ) -> Self {
        let (old_value, new_value) = change;
        Self {
            field: Some(field),
            old_value,
            new_value,
            ..Self::record(task_id, TaskEventType::TaskUpdated, user_id, clock)
        }
    }

    /// Records a summary change.
    #[must_use]
    pub fn summary_updated(
        task_id: TaskId,
        old: &str,
        new: &str,
        user_id: UserId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            old_value: Some(Value::String(old.to_owned())),
            new_value: Some(Value::String(new.to_owned())),
            ..Self::record(task_id, TaskEventType::SummaryUpdated, user_id, clock)
        }
    }

    /// Records a status change with serialized status snapshots.
    #[must_use]
    pub fn status_updated(
        task_id: TaskId,
        old: &StatusSnapshot,
        new: &StatusSnapshot,
        user_id: UserId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            old_value: Some(status_json(old)),
            new_value: Some(status_json(new)),
            ..Self::record(task_id, TaskEventType::StatusUpdated, user_id, clock)
        }
    }

    /// Records a new link on its source task.
    #[must_use]
    pub fn link_created(
        link: &Link,
        link_type: &LinkType,
        user_id: UserId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            new_value: Some(link_json(link, link_type)),
            ..Self::record(link.src_task_id(), TaskEventType::LinkCreated, user_id, clock)
        }
    }

    /// Records a removed link on its source task.
    #[must_use]
    pub fn link_deleted(
        link: &Link,
        link_type: &LinkType,
        user_id: UserId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            old_value: Some(link_json(link, link_type)),
            ..Self::record(link.src_task_id(), TaskEventType::LinkDeleted, user_id, clock)
        }
    }

    /// Reconstructs an event from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskEventData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            event_type: data.event_type,
            field: data.field,
            old_value: data.old_value,
            new_value: data.new_value,
            user_id: data.user_id,
            created_at: data.created_at,
        }
    }

    /// Returns the event identifier.
    #[must_use]
    pub const fn id(&self) -> TaskEventId {
        self.id
    }

    /// Returns the task the event belongs to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the event type.
    #[must_use]
    pub const fn event_type(&self) -> TaskEventType {
        self.event_type
    }

    /// Returns the field touched by a `TASK_UPDATED` event.
    #[must_use]
    pub const fn field(&self) -> Option<&FieldSnapshot> {
        self.field.as_ref()
    }

    /// Returns the value before the change.
    #[must_use]
    pub const fn old_value(&self) -> Option<&Value> {
        self.old_value.as_ref()
    }

    /// Returns the value after the change.
    #[must_use]
    pub const fn new_value(&self) -> Option<&Value> {
        self.new_value.as_ref()
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn status_json(status: &StatusSnapshot) -> Value {
    json!({
        "id": status.id.to_string(),
        "name": status.name,
        "status_type": {
            "id": status.status_type.id.to_string(),
            "name": status.status_type.name,
        },
    })
}

fn link_json(link: &Link, link_type: &LinkType) -> Value {
    json!({
        "id": link.id().to_string(),
        "link_type": {
            "id": link_type.id().to_string(),
            "src_name": link_type.src_name(),
            "dest_name": link_type.dest_name(),
        },
        "src_task": link.src_task_id().to_string(),
        "dest_task": link.dest_task_id().to_string(),
    })
}
