//! Typed relations between two tasks.

use super::{LinkId, TaskDomainError, TaskId};
use crate::schema::domain::LinkTypeId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Directed link from a source task to a destination task.
///
/// At most one link of a given type connects the same ordered pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    id: LinkId,
    link_type_id: LinkTypeId,
    src_task_id: TaskId,
    dest_task_id: TaskId,
    created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a link between two distinct tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SelfLink`] when both ends are the same task.
    pub fn new(
        link_type_id: LinkTypeId,
        src_task_id: TaskId,
        dest_task_id: TaskId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        if src_task_id == dest_task_id {
            return Err(TaskDomainError::SelfLink);
        }
        Ok(Self {
            id: LinkId::new(),
            link_type_id,
            src_task_id,
            dest_task_id,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a link from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: LinkId,
        link_type_id: LinkTypeId,
        (src_task_id, dest_task_id): (TaskId, TaskId),
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            link_type_id,
            src_task_id,
            dest_task_id,
            created_at,
        }
    }

    /// Returns the link identifier.
    #[must_use]
    pub const fn id(&self) -> LinkId {
        self.id
    }

    /// Returns the link type.
    #[must_use]
    pub const fn link_type_id(&self) -> LinkTypeId {
        self.link_type_id
    }

    /// Returns the source task.
    #[must_use]
    pub const fn src_task_id(&self) -> TaskId {
        self.src_task_id
    }

    /// Returns the destination task.
    #[must_use]
    pub const fn dest_task_id(&self) -> TaskId {
        self.dest_task_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `true` when `task_id` is either end of the link.
    #[must_use]
    pub fn touches(&self, task_id: TaskId) -> bool {
        self.src_task_id == task_id || self.dest_task_id == task_id
    }

    /// Returns `true` when both links connect the same ordered pair with the
    /// same type.
    #[must_use]
    pub fn duplicates(&self, other: &Self) -> bool {
        self.link_type_id == other.link_type_id
            && self.src_task_id == other.src_task_id
            && self.dest_task_id == other.dest_task_id
    }
}
