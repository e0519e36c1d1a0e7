//! Repository port for task persistence.
//!
//! Every mutating operation is atomic: the task row, its field values and the
//! events describing the change commit together or not at all.

use crate::schema::domain::{FieldId, LinkTypeId, ProjectId, ProjectSchemaId, StatusId};
use crate::task::domain::{
    FieldValue, Link, LinkId, Summary, Task, TaskEvent, TaskId, TaskKey, TaskNumber,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Changes to one task committed in a single transaction.
///
/// The update was computed against the task at `expected_revision`; the
/// store applies it only while the task still sits at that revision. The
/// status changes exclusively through
/// [`TaskRepository::commit_status_change`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    /// Edited task.
    pub task_id: TaskId,
    /// Revision the old values in `events` were read at.
    pub expected_revision: u64,
    /// New summary, when the edit renames the task.
    pub summary: Option<Summary>,
    /// New modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Field values to insert or replace.
    pub upserts: Vec<FieldValue>,
    /// Fields whose values are removed.
    pub clears: Vec<FieldId>,
    /// Events describing the change.
    pub events: Vec<TaskEvent>,
}

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task with its initial field values and events.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists or [`TaskRepositoryError::DuplicateTaskKey`] when another task
    /// holds the same key.
    async fn insert_task(
        &self,
        task: &Task,
        values: &[FieldValue],
        events: &[TaskEvent],
    ) -> TaskRepositoryResult<()>;

    /// Returns the highest task number allocated in the project.
    async fn max_task_number(
        &self,
        project_id: ProjectId,
    ) -> TaskRepositoryResult<Option<TaskNumber>>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the project's tasks, newest first.
    async fn list_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>>;

    /// Counts the tasks governed by a schema.
    async fn count_by_schema(&self, schema_id: ProjectSchemaId) -> TaskRepositoryResult<u64>;

    /// Returns the task's field values.
    async fn field_values(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<FieldValue>>;

    /// Returns the task's events, newest first.
    async fn events(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskEvent>>;

    /// Applies a summary and field value update with its events and advances
    /// the task's revision.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::StaleRevision`] when another edit
    /// committed after the update was computed and
    /// [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn apply_update(&self, update: &TaskUpdate) -> TaskRepositoryResult<()>;

    /// Moves `task` to its new status if it still sits in `expected`, and
    /// records `event`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::StaleStatus`] when the stored status no
    /// longer matches `expected` and [`TaskRepositoryError::NotFound`] when
    /// the task does not exist.
    async fn commit_status_change(
        &self,
        task: &Task,
        expected: StatusId,
        event: &TaskEvent,
    ) -> TaskRepositoryResult<()>;

    /// Deletes a task with its field values and events.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::TaskHasLinks`] when links still
    /// reference the task and [`TaskRepositoryError::NotFound`] when it does
    /// not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Stores a link and the event recorded on its source task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateLink`] when an identical link
    /// exists and [`TaskRepositoryError::NotFound`] when either task is
    /// missing.
    async fn insert_link(&self, link: &Link, event: &TaskEvent) -> TaskRepositoryResult<()>;

    /// Finds a link by identifier.
    async fn find_link(&self, id: LinkId) -> TaskRepositoryResult<Option<Link>>;

    /// Removes a link and records the event on its source task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::LinkNotFound`] when the link does not
    /// exist.
    async fn delete_link(&self, id: LinkId, event: &TaskEvent) -> TaskRepositoryResult<()>;

    /// Returns every link with the task at either end.
    async fn links_for(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Link>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A task with the same key already exists.
    #[error("duplicate task key: {0}")]
    DuplicateTaskKey(TaskKey),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The task left the expected status before the change committed.
    #[error("task {task_id} is in status {actual}, expected {expected}")]
    StaleStatus {
        /// The task.
        task_id: TaskId,
        /// Status the change was validated against.
        expected: StatusId,
        /// Status found in the store.
        actual: StatusId,
    },

    /// Another edit committed after the update was computed.
    #[error("task {task_id} is at revision {actual}, expected {expected}")]
    StaleRevision {
        /// The task.
        task_id: TaskId,
        /// Revision the update was computed against.
        expected: u64,
        /// Revision found in the store.
        actual: u64,
    },

    /// Links still reference the task.
    #[error("task {0} still participates in links")]
    TaskHasLinks(TaskId),

    /// An identical link already exists.
    #[error("link of type {link_type_id} from {src_task_id} to {dest_task_id} already exists")]
    DuplicateLink {
        /// Link type.
        link_type_id: LinkTypeId,
        /// Source task.
        src_task_id: TaskId,
        /// Destination task.
        dest_task_id: TaskId,
    },

    /// The link was not found.
    #[error("link not found: {0}")]
    LinkNotFound(LinkId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
