//! Store port for schema registry entities.

use crate::error::MissingEntity;
use crate::schema::domain::{
    Field, FieldId, FieldType, FieldTypeId, InvariantViolation, LinkType, LinkTypeId, Project,
    ProjectId, ProjectSchema, ProjectSchemaId, Screen, ScreenId, Status, StatusId, StatusType,
    StatusTypeId, TaskType, TaskTypeId, Transition, Workflow, WorkflowGraph, WorkflowId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for schema registry store operations.
pub type SchemaRegistryResult<T> = Result<T, SchemaRegistryError>;

/// Schema registry persistence contract.
///
/// Writes are raw: argument validation happens in the registry service. The
/// store still re-checks the invariants that depend on other rows (one
/// initial transition per workflow, one active schema per project and task
/// type) under its own lock or transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// Stores a status category.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaRegistryError::DuplicateName`] when the name is taken.
    async fn store_status_type(&self, status_type: &StatusType) -> SchemaRegistryResult<()>;

    /// Finds a status category.
    async fn find_status_type(
        &self,
        id: StatusTypeId,
    ) -> SchemaRegistryResult<Option<StatusType>>;

    /// Stores a status.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaRegistryError::DuplicateName`] when the name is taken.
    async fn store_status(&self, status: &Status) -> SchemaRegistryResult<()>;

    /// Finds a status with its status type.
    async fn find_status(&self, id: StatusId) -> SchemaRegistryResult<Option<Status>>;

    /// Stores an empty workflow.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaRegistryError::DuplicateName`] when the name is taken.
    async fn store_workflow(&self, workflow: &Workflow) -> SchemaRegistryResult<()>;

    /// Appends a transition to its workflow.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaRegistryError::NotFound`] when the workflow is unknown
    /// and [`SchemaRegistryError::Invariant`] with
    /// [`InvariantViolation::DuplicateInitialTransition`] when the transition
    /// is initial and the workflow already has one.
    async fn store_transition(&self, transition: &Transition) -> SchemaRegistryResult<()>;

    /// Finds a workflow with all its transitions in definition order.
    async fn find_workflow(&self, id: WorkflowId) -> SchemaRegistryResult<Option<WorkflowGraph>>;

    /// Stores a field type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaRegistryError::DuplicateName`] when the key is taken.
    async fn store_field_type(&self, field_type: &FieldType) -> SchemaRegistryResult<()>;

    /// Finds a field type.
    async fn find_field_type(&self, id: FieldTypeId) -> SchemaRegistryResult<Option<FieldType>>;

    /// Stores a field.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaRegistryError::DuplicateName`] when the key is taken.
    async fn store_field(&self, field: &Field) -> SchemaRegistryResult<()>;

    /// Finds a field.
    async fn find_field(&self, id: FieldId) -> SchemaRegistryResult<Option<Field>>;

    /// Stores a screen with its field placements.
    async fn store_screen(&self, screen: &Screen) -> SchemaRegistryResult<()>;

    /// Finds a screen.
    async fn find_screen(&self, id: ScreenId) -> SchemaRegistryResult<Option<Screen>>;

    /// Stores a project.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaRegistryError::DuplicateName`] when the key or the
    /// name is taken.
    async fn store_project(&self, project: &Project) -> SchemaRegistryResult<()>;

    /// Finds a project.
    async fn find_project(&self, id: ProjectId) -> SchemaRegistryResult<Option<Project>>;

    /// Stores a task type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaRegistryError::DuplicateName`] when the name is taken.
    async fn store_task_type(&self, task_type: &TaskType) -> SchemaRegistryResult<()>;

    /// Finds a task type.
    async fn find_task_type(&self, id: TaskTypeId) -> SchemaRegistryResult<Option<TaskType>>;

    /// Stores a project schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaRegistryError::Invariant`] with
    /// [`InvariantViolation::DuplicateActiveSchema`] when the schema is active
    /// and another active schema binds the same project and task type.
    async fn store_project_schema(&self, schema: &ProjectSchema) -> SchemaRegistryResult<()>;

    /// Flips the activation flag of a stored schema and returns the result.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaRegistryError::NotFound`] when the schema is unknown
    /// and [`SchemaRegistryError::Invariant`] when activation would leave two
    /// active schemas for the same pair.
    async fn set_schema_active(
        &self,
        id: ProjectSchemaId,
        is_active: bool,
    ) -> SchemaRegistryResult<ProjectSchema>;

    /// Finds a project schema.
    async fn find_project_schema(
        &self,
        id: ProjectSchemaId,
    ) -> SchemaRegistryResult<Option<ProjectSchema>>;

    /// Returns every active schema for the pair. More than one entry means
    /// the store is corrupt.
    async fn active_schemas(
        &self,
        project_id: ProjectId,
        task_type_id: TaskTypeId,
    ) -> SchemaRegistryResult<Vec<ProjectSchema>>;

    /// Stores a link type.
    async fn store_link_type(&self, link_type: &LinkType) -> SchemaRegistryResult<()>;

    /// Finds a link type.
    async fn find_link_type(&self, id: LinkTypeId) -> SchemaRegistryResult<Option<LinkType>>;

    /// Returns every link type.
    async fn list_link_types(&self) -> SchemaRegistryResult<Vec<LinkType>>;
}

/// Errors returned by schema registry store implementations.
#[derive(Debug, Clone, Error)]
pub enum SchemaRegistryError {
    /// A unique name or key is already taken.
    #[error("duplicate {kind} name: {name}")]
    DuplicateName {
        /// Kind of entity.
        kind: &'static str,
        /// Conflicting name.
        name: String,
    },

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(MissingEntity),

    /// The write would break a registry invariant.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SchemaRegistryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
