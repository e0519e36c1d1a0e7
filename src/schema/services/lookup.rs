//! Read access to the schema registry with integrity checks.

use crate::error::MissingEntity;
use crate::schema::{
    domain::{
        Field, FieldId, InvariantViolation, LinkType, LinkTypeId, Project, ProjectId,
        ProjectSchema, ProjectSchemaId, Screen, ScreenId, Status, StatusId, TaskTypeId,
        WorkflowGraph, WorkflowId,
    },
    ports::SchemaRegistry,
};
use std::sync::Arc;

use super::{SchemaServiceError, SchemaServiceResult};

/// Resolves registry entities by id and turns absence into
/// [`SchemaServiceError::NotFound`].
///
/// Lookups that must uphold registry invariants (a single active schema per
/// project and task type, an initial transition per workflow) report stored
/// violations as [`SchemaServiceError::InvariantViolation`].
pub struct SchemaLookup<S>
where
    S: SchemaRegistry,
{
    registry: Arc<S>,
}

impl<S> Clone for SchemaLookup<S>
where
    S: SchemaRegistry,
{
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<S> SchemaLookup<S>
where
    S: SchemaRegistry,
{
    /// Creates a lookup over `registry`.
    #[must_use]
    pub const fn new(registry: Arc<S>) -> Self {
        Self { registry }
    }

    /// Returns the underlying registry store.
    #[must_use]
    pub const fn registry(&self) -> &Arc<S> {
        &self.registry
    }

    /// Returns the single active schema for the project and task type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError::NotFound`] when no schema is active and
    /// [`InvariantViolation::MultipleActiveSchemas`] when several are.
    pub async fn active_schema(
        &self,
        project_id: ProjectId,
        task_type_id: TaskTypeId,
    ) -> SchemaServiceResult<ProjectSchema> {
        let mut active = self
            .registry
            .active_schemas(project_id, task_type_id)
            .await?;
        if active.len() > 1 {
            return Err(InvariantViolation::MultipleActiveSchemas {
                project_id,
                task_type_id,
            }
            .into());
        }
        active.pop().ok_or(SchemaServiceError::NotFound(
            MissingEntity::ActiveSchema {
                project_id,
                task_type_id,
            },
        ))
    }

    /// Returns a workflow with its transitions in definition order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError::NotFound`] for an unknown workflow and
    /// [`InvariantViolation::MissingInitialTransition`] when the workflow has
    /// no initial transition.
    pub async fn workflow(&self, id: WorkflowId) -> SchemaServiceResult<WorkflowGraph> {
        let graph = self
            .registry
            .find_workflow(id)
            .await?
            .ok_or(SchemaServiceError::NotFound(MissingEntity::Workflow(id)))?;
        if graph.initial_transition().is_none() {
            return Err(InvariantViolation::MissingInitialTransition(id).into());
        }
        Ok(graph)
    }

    /// Returns a status with its status type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError::NotFound`] for an unknown status.
    pub async fn status(&self, id: StatusId) -> SchemaServiceResult<Status> {
        self.registry
            .find_status(id)
            .await?
            .ok_or(SchemaServiceError::NotFound(MissingEntity::Status(id)))
    }

    /// Returns a field.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError::NotFound`] for an unknown field.
    pub async fn field(&self, id: FieldId) -> SchemaServiceResult<Field> {
        self.registry
            .find_field(id)
            .await?
            .ok_or(SchemaServiceError::NotFound(MissingEntity::Field(id)))
    }

    /// Returns a screen.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError::NotFound`] for an unknown screen.
    pub async fn screen(&self, id: ScreenId) -> SchemaServiceResult<Screen> {
        self.registry
            .find_screen(id)
            .await?
            .ok_or(SchemaServiceError::NotFound(MissingEntity::Screen(id)))
    }

    /// Returns a project.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError::NotFound`] for an unknown project.
    pub async fn project(&self, id: ProjectId) -> SchemaServiceResult<Project> {
        self.registry
            .find_project(id)
            .await?
            .ok_or(SchemaServiceError::NotFound(MissingEntity::Project(id)))
    }

    /// Returns a project schema regardless of its activation flag.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError::NotFound`] for an unknown schema.
    pub async fn project_schema(&self, id: ProjectSchemaId) -> SchemaServiceResult<ProjectSchema> {
        self.registry
            .find_project_schema(id)
            .await?
            .ok_or(SchemaServiceError::NotFound(MissingEntity::ProjectSchema(
                id,
            )))
    }

    /// Returns a link type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError::NotFound`] for an unknown link type.
    pub async fn link_type(&self, id: LinkTypeId) -> SchemaServiceResult<LinkType> {
        self.registry
            .find_link_type(id)
            .await?
            .ok_or(SchemaServiceError::NotFound(MissingEntity::LinkType(id)))
    }

    /// Returns every link type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError::Registry`] when the store fails.
    pub async fn link_types(&self) -> SchemaServiceResult<Vec<LinkType>> {
        Ok(self.registry.list_link_types().await?)
    }
}
