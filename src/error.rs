//! Error classification shared by the engine's service layers.
//!
//! Service errors report whether the caller sent an invalid request or the
//! engine itself failed, so outer surfaces can map them without matching on
//! every variant.

use crate::schema::domain::{
    FieldId, FieldTypeId, LinkTypeId, ProjectId, ProjectSchemaId, ScreenId, StatusId,
    StatusTypeId, TaskTypeId, TransitionId, WorkflowId,
};
use crate::task::domain::{LinkId, TaskId};
use std::fmt;

/// Who is responsible for a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The request was invalid or lost a race with a concurrent change.
    Client,
    /// An invariant or the store failed.
    Internal,
}

impl ErrorClass {
    /// Returns `true` for [`ErrorClass::Client`].
    #[must_use]
    pub const fn is_client(self) -> bool {
        matches!(self, Self::Client)
    }
}

/// Reference to an entity that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingEntity {
    /// Unknown status type.
    StatusType(StatusTypeId),
    /// Unknown status.
    Status(StatusId),
    /// Unknown workflow.
    Workflow(WorkflowId),
    /// Unknown transition.
    Transition(TransitionId),
    /// Unknown field type.
    FieldType(FieldTypeId),
    /// Unknown field.
    Field(FieldId),
    /// Unknown screen.
    Screen(ScreenId),
    /// Unknown project.
    Project(ProjectId),
    /// Unknown task type.
    TaskType(TaskTypeId),
    /// Unknown project schema.
    ProjectSchema(ProjectSchemaId),
    /// No schema is active for the project and task type.
    ActiveSchema {
        /// Requested project.
        project_id: ProjectId,
        /// Requested task type.
        task_type_id: TaskTypeId,
    },
    /// Unknown link type.
    LinkType(LinkTypeId),
    /// Unknown link.
    Link(LinkId),
    /// Unknown task.
    Task(TaskId),
}

impl fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StatusType(id) => write!(f, "status type {id}"),
            Self::Status(id) => write!(f, "status {id}"),
            Self::Workflow(id) => write!(f, "workflow {id}"),
            Self::Transition(id) => write!(f, "transition {id}"),
            Self::FieldType(id) => write!(f, "field type {id}"),
            Self::Field(id) => write!(f, "field {id}"),
            Self::Screen(id) => write!(f, "screen {id}"),
            Self::Project(id) => write!(f, "project {id}"),
            Self::TaskType(id) => write!(f, "task type {id}"),
            Self::ProjectSchema(id) => write!(f, "project schema {id}"),
            Self::ActiveSchema {
                project_id,
                task_type_id,
            } => write!(
                f,
                "active schema for project {project_id} and task type {task_type_id}"
            ),
            Self::LinkType(id) => write!(f, "link type {id}"),
            Self::Link(id) => write!(f, "link {id}"),
            Self::Task(id) => write!(f, "task {id}"),
        }
    }
}
