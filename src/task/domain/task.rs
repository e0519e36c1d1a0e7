//! Task aggregate root.

use super::{Summary, TaskId, TaskKey, TaskNumber};
use crate::identity::UserId;
use crate::schema::domain::{ProjectId, ProjectSchemaId, StatusId, TaskTypeId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Where a new task lives: its schema, its slot in the project's numbering
/// and the status it starts in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPlacement {
    /// Schema governing the task.
    pub schema_id: ProjectSchemaId,
    /// Project owning the task.
    pub project_id: ProjectId,
    /// Task type of the task.
    pub task_type_id: TaskTypeId,
    /// Allocated sequential number.
    pub number: TaskNumber,
    /// Key composed from the project key and number.
    pub key: TaskKey,
    /// Destination of the workflow's initial transition.
    pub status: StatusId,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    schema_id: ProjectSchemaId,
    project_id: ProjectId,
    task_type_id: TaskTypeId,
    number: TaskNumber,
    key: TaskKey,
    summary: Summary,
    status: StatusId,
    creator: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    revision: u64,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted schema binding.
    pub schema_id: ProjectSchemaId,
    /// Persisted project.
    pub project_id: ProjectId,
    /// Persisted task type.
    pub task_type_id: TaskTypeId,
    /// Persisted sequential number.
    pub number: TaskNumber,
    /// Persisted task key.
    pub key: TaskKey,
    /// Persisted summary.
    pub summary: Summary,
    /// Persisted current status.
    pub status: StatusId,
    /// Persisted creator.
    pub creator: UserId,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted edit revision.
    pub revision: u64,
}

impl Task {
    /// Creates a new task in its initial status.
    #[must_use]
    pub fn new(
        placement: TaskPlacement,
        summary: Summary,
        creator: UserId,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        let TaskPlacement {
            schema_id,
            project_id,
            task_type_id,
            number,
            key,
            status,
        } = placement;
        Self {
            id: TaskId::new(),
            schema_id,
            project_id,
            task_type_id,
            number,
            key,
            summary,
            status,
            creator,
            created_at: timestamp,
            updated_at: timestamp,
            revision: 0,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            schema_id: data.schema_id,
            project_id: data.project_id,
            task_type_id: data.task_type_id,
            number: data.number,
            key: data.key,
            summary: data.summary,
            status: data.status,
            creator: data.creator,
            created_at: data.created_at,
            updated_at: data.updated_at,
            revision: data.revision,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the governing schema.
    #[must_use]
    pub const fn schema_id(&self) -> ProjectSchemaId {
        self.schema_id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the task type.
    #[must_use]
    pub const fn task_type_id(&self) -> TaskTypeId {
        self.task_type_id
    }

    /// Returns the sequential number within the project.
    #[must_use]
    pub const fn number(&self) -> TaskNumber {
        self.number
    }

    /// Returns the task key.
    #[must_use]
    pub const fn key(&self) -> &TaskKey {
        &self.key
    }

    /// Returns the summary.
    #[must_use]
    pub const fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> StatusId {
        self.status
    }

    /// Returns the user who created the task.
    #[must_use]
    pub const fn creator(&self) -> UserId {
        self.creator
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the number of committed summary and field edits.
    ///
    /// Status moves leave the revision unchanged.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the summary and returns the previous one when it changed.
    pub fn rename(&mut self, summary: Summary, clock: &impl Clock) -> Option<Summary> {
        if self.summary == summary {
            return None;
        }
        let previous = std::mem::replace(&mut self.summary, summary);
        self.touch(clock);
        Some(previous)
    }

    /// Moves the task to `status`.
    pub fn move_to(&mut self, status: StatusId, clock: &impl Clock) {
        self.status = status;
        self.touch(clock);
    }

    /// Records a committed edit: replaces the summary when one is given,
    /// sets the modification timestamp and advances the revision. The status
    /// is left untouched.
    pub fn record_edit(&mut self, summary: Option<Summary>, updated_at: DateTime<Utc>) {
        if let Some(renamed) = summary {
            self.summary = renamed;
        }
        self.updated_at = updated_at;
        self.revision = self.revision.saturating_add(1);
    }

    /// Copies the status and modification timestamp from a moved copy of
    /// this task.
    pub const fn absorb_move(&mut self, moved: &Self) {
        self.status = moved.status;
        self.updated_at = moved.updated_at;
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    pub fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
