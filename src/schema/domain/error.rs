//! Error types for schema registry domain validation.

use super::{ProjectId, ProjectSchemaId, TaskTypeId, WorkflowId};
use crate::task::domain::TaskId;
use thiserror::Error;

/// Errors returned while constructing schema domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaDomainError {
    /// A required name is empty after trimming.
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    /// The project key is not a non-empty run of alphanumerics.
    #[error("invalid project key '{0}', expected uppercase letters and digits")]
    InvalidProjectKey(String),

    /// An initial transition declared a source status.
    #[error("initial transition '{0}' must not declare a source status")]
    InitialTransitionWithSource(String),
}

/// Structural invariants of the tracker that writes must never break.
///
/// These signal either a rejected write or, when observed on read, a
/// data-integrity violation in the store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A workflow already owns an initial transition.
    #[error("workflow {0} already has an initial transition")]
    DuplicateInitialTransition(WorkflowId),

    /// A workflow has no initial transition to create tasks with.
    #[error("workflow {0} has no initial transition")]
    MissingInitialTransition(WorkflowId),

    /// Another schema is already active for the project and task type.
    #[error("project {project_id} already has an active schema for task type {task_type_id}")]
    DuplicateActiveSchema {
        /// Project of the conflicting schema.
        project_id: ProjectId,
        /// Task type of the conflicting schema.
        task_type_id: TaskTypeId,
    },

    /// More than one schema is active for the project and task type.
    #[error("project {project_id} has multiple active schemas for task type {task_type_id}")]
    MultipleActiveSchemas {
        /// Project with conflicting schemas.
        project_id: ProjectId,
        /// Task type with conflicting schemas.
        task_type_id: TaskTypeId,
    },

    /// The schema is still referenced by tasks.
    #[error("project schema {0} cannot be deactivated while tasks reference it")]
    DeactivationWithTasks(ProjectSchemaId),

    /// The task still participates in links.
    #[error("task {0} cannot be deleted while links reference it")]
    TaskHasLinks(TaskId),
}

impl InvariantViolation {
    /// Returns `true` when the violation was observed in stored data rather
    /// than raised against a rejected write.
    #[must_use]
    pub const fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingInitialTransition(_) | Self::MultipleActiveSchemas { .. }
        )
    }
}
