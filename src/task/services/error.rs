//! Service-level errors for task operations.

use crate::error::{ErrorClass, MissingEntity};
use crate::extension::ports::ResolveError;
use crate::permission::PermissionDenied;
use crate::schema::{
    domain::{InvariantViolation, TransitionId},
    services::SchemaServiceError,
};
use crate::task::{
    domain::{TaskDomainError, TaskId},
    ports::TaskRepositoryError,
};
use crate::validation::SchemaViolation;
use thiserror::Error;

/// Errors returned by [`super::TaskService`] and [`super::TransitionEngine`].
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// A field value or field set failed validation.
    #[error(transparent)]
    SchemaViolation(#[from] SchemaViolation),

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(MissingEntity),

    /// A schema or task invariant was violated.
    #[error(transparent)]
    InvariantViolation(InvariantViolation),

    /// The transition is not eligible for the task in its current status.
    #[error("transition {transition_id} is not allowed for task {task_id}")]
    TransitionNotAllowed {
        /// The task.
        task_id: TaskId,
        /// The rejected transition.
        transition_id: TransitionId,
    },

    /// Another edit of the task committed after this one was computed.
    #[error("task {0} was edited concurrently")]
    EditConflict(TaskId),

    /// A condition could not be resolved.
    #[error(transparent)]
    UnresolvedExtension(#[from] ResolveError),

    /// The user lacks the required permission.
    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),

    /// Schema registry failure.
    #[error(transparent)]
    Schema(SchemaServiceError),

    /// Task store failure.
    #[error(transparent)]
    Repository(TaskRepositoryError),
}

impl From<SchemaServiceError> for TaskServiceError {
    fn from(err: SchemaServiceError) -> Self {
        match err {
            SchemaServiceError::NotFound(entity) => Self::NotFound(entity),
            SchemaServiceError::InvariantViolation(violation) => {
                Self::InvariantViolation(violation)
            }
            SchemaServiceError::SchemaViolation(violation) => Self::SchemaViolation(violation),
            SchemaServiceError::Tasks(inner) => inner.into(),
            other => Self::Schema(other),
        }
    }
}

impl From<TaskRepositoryError> for TaskServiceError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(id) => Self::NotFound(MissingEntity::Task(id)),
            TaskRepositoryError::LinkNotFound(id) => Self::NotFound(MissingEntity::Link(id)),
            TaskRepositoryError::TaskHasLinks(id) => {
                Self::InvariantViolation(InvariantViolation::TaskHasLinks(id))
            }
            TaskRepositoryError::StaleRevision { task_id, .. } => Self::EditConflict(task_id),
            other => Self::Repository(other),
        }
    }
}

impl TaskServiceError {
    /// Classifies the error as a client or internal failure.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Domain(_)
            | Self::SchemaViolation(_)
            | Self::NotFound(_)
            | Self::TransitionNotAllowed { .. }
            | Self::EditConflict(_)
            | Self::PermissionDenied(_)
            | Self::Repository(TaskRepositoryError::DuplicateLink { .. }) => ErrorClass::Client,
            Self::InvariantViolation(violation) if !violation.is_integrity_failure() => {
                ErrorClass::Client
            }
            Self::Schema(inner) => inner.class(),
            Self::InvariantViolation(_) | Self::UnresolvedExtension(_) | Self::Repository(_) => {
                ErrorClass::Internal
            }
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;
