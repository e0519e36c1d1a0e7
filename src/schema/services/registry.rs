//! Write-side orchestration for the schema registry.

use crate::error::MissingEntity;
use crate::schema::{
    domain::{
        AccessGroups, Field, FieldId, FieldType, FieldTypeId, InvariantViolation, LinkType,
        Project, ProjectId, ProjectSchema, ProjectSchemaId, SchemaDomainError, Screen,
        ScreenField, ScreenId, Status, StatusId, StatusType, StatusTypeId, TaskType, TaskTypeId,
        Transition, Workflow, WorkflowId,
    },
    ports::SchemaRegistry,
};
use crate::task::ports::TaskRepository;
use crate::validation::{ensure_schema_document, validate_config, validate_extension_specs};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::{SchemaLookup, SchemaServiceError, SchemaServiceResult};

/// Request payload for adding a transition to a workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct DefineTransitionRequest {
    workflow_id: WorkflowId,
    name: String,
    src_status: Option<StatusId>,
    dest_status: StatusId,
    is_initial: bool,
    conditions: Value,
    postfunctions: Value,
}

impl DefineTransitionRequest {
    /// Creates a request for a regular transition without guards or side
    /// effects.
    #[must_use]
    pub fn new(
        workflow_id: WorkflowId,
        name: impl Into<String>,
        src_status: Option<StatusId>,
        dest_status: StatusId,
    ) -> Self {
        Self {
            workflow_id,
            name: name.into(),
            src_status,
            dest_status,
            is_initial: false,
            conditions: Value::Null,
            postfunctions: Value::Null,
        }
    }

    /// Creates a request for the workflow's initial transition.
    #[must_use]
    pub fn initial(workflow_id: WorkflowId, name: impl Into<String>, dest_status: StatusId) -> Self {
        let mut request = Self::new(workflow_id, name, None, dest_status);
        request.is_initial = true;
        request
    }

    /// Marks the transition as initial or regular.
    #[must_use]
    pub const fn with_initial(mut self, is_initial: bool) -> Self {
        self.is_initial = is_initial;
        self
    }

    /// Sets the raw condition specs.
    #[must_use]
    pub fn with_conditions(mut self, conditions: Value) -> Self {
        self.conditions = conditions;
        self
    }

    /// Sets the raw postfunction specs.
    #[must_use]
    pub fn with_postfunctions(mut self, postfunctions: Value) -> Self {
        self.postfunctions = postfunctions;
        self
    }
}

/// Request payload for defining a field.
#[derive(Debug, Clone, PartialEq)]
pub struct DefineFieldRequest {
    field_type_id: FieldTypeId,
    key: String,
    name: String,
    description: Option<String>,
    config: Option<Value>,
}

impl DefineFieldRequest {
    /// Creates a request with the required field attributes.
    #[must_use]
    pub fn new(field_type_id: FieldTypeId, key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            field_type_id,
            key: key.into(),
            name: name.into(),
            description: None,
            config: None,
        }
    }

    /// Sets the field description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the field config.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }
}

/// Placement of an existing field on a new screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenFieldRequest {
    /// Field to place.
    pub field_id: FieldId,
    /// Whether tasks must carry a value.
    pub is_required: bool,
    /// Display priority (ascending).
    pub priority: i32,
}

/// Request payload for binding a project and task type to a workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct DefineProjectSchemaRequest {
    project_id: ProjectId,
    task_type_id: TaskTypeId,
    workflow_id: WorkflowId,
    screen_id: ScreenId,
    event_listeners: Value,
    access: AccessGroups,
}

impl DefineProjectSchemaRequest {
    /// Creates a request without listeners or access restrictions.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        task_type_id: TaskTypeId,
        workflow_id: WorkflowId,
        screen_id: ScreenId,
    ) -> Self {
        Self {
            project_id,
            task_type_id,
            workflow_id,
            screen_id,
            event_listeners: Value::Null,
            access: AccessGroups::default(),
        }
    }

    /// Sets the raw event listener specs.
    #[must_use]
    pub fn with_event_listeners(mut self, event_listeners: Value) -> Self {
        self.event_listeners = event_listeners;
        self
    }

    /// Sets the access groups.
    #[must_use]
    pub fn with_access(mut self, access: AccessGroups) -> Self {
        self.access = access;
        self
    }
}

/// Schema registry write service.
///
/// Validates every definition before handing it to the store, including the
/// JSON documents embedded in transitions, fields and project schemas.
pub struct SchemaRegistryService<S, T>
where
    S: SchemaRegistry,
    T: TaskRepository,
{
    lookup: SchemaLookup<S>,
    tasks: Arc<T>,
}

impl<S, T> Clone for SchemaRegistryService<S, T>
where
    S: SchemaRegistry,
    T: TaskRepository,
{
    fn clone(&self) -> Self {
        Self {
            lookup: self.lookup.clone(),
            tasks: Arc::clone(&self.tasks),
        }
    }
}

impl<S, T> SchemaRegistryService<S, T>
where
    S: SchemaRegistry,
    T: TaskRepository,
{
    /// Creates a registry service.
    #[must_use]
    pub const fn new(registry: Arc<S>, tasks: Arc<T>) -> Self {
        Self {
            lookup: SchemaLookup::new(registry),
            tasks,
        }
    }

    /// Returns the read side of the registry.
    #[must_use]
    pub const fn lookup(&self) -> &SchemaLookup<S> {
        &self.lookup
    }

    fn registry(&self) -> &S {
        self.lookup.registry()
    }

    /// Defines a status category.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError`] when the name is blank or taken.
    pub async fn define_status_type(&self, name: &str) -> SchemaServiceResult<StatusType> {
        let status_type = StatusType::new(name)?;
        self.registry().store_status_type(&status_type).await?;
        Ok(status_type)
    }

    /// Defines a status in an existing category.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError`] when the category is unknown or the name
    /// is blank or taken.
    pub async fn define_status(
        &self,
        name: &str,
        status_type_id: StatusTypeId,
    ) -> SchemaServiceResult<Status> {
        let status_type = self
            .registry()
            .find_status_type(status_type_id)
            .await?
            .ok_or(SchemaServiceError::NotFound(MissingEntity::StatusType(
                status_type_id,
            )))?;
        let status = Status::new(name, status_type)?;
        self.registry().store_status(&status).await?;
        Ok(status)
    }

    /// Defines an empty workflow.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError`] when the name is blank or taken.
    pub async fn define_workflow(&self, name: &str) -> SchemaServiceResult<Workflow> {
        let workflow = Workflow::new(name)?;
        self.registry().store_workflow(&workflow).await?;
        info!(workflow_id = %workflow.id(), name = workflow.name(), "workflow defined");
        Ok(workflow)
    }

    /// Adds a transition to a workflow.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError::NotFound`] when the workflow or a status
    /// is unknown, [`SchemaDomainError::InitialTransitionWithSource`] when an
    /// initial transition names a source status,
    /// [`InvariantViolation::DuplicateInitialTransition`] when the workflow
    /// already has an initial transition, and
    /// [`SchemaServiceError::SchemaViolation`] when the condition or
    /// postfunction specs are malformed.
    pub async fn define_transition(
        &self,
        request: DefineTransitionRequest,
    ) -> SchemaServiceResult<Transition> {
        let DefineTransitionRequest {
            workflow_id,
            name,
            src_status,
            dest_status,
            is_initial,
            conditions,
            postfunctions,
        } = request;

        if is_initial && src_status.is_some() {
            return Err(SchemaDomainError::InitialTransitionWithSource(name).into());
        }
        let graph = self
            .registry()
            .find_workflow(workflow_id)
            .await?
            .ok_or(SchemaServiceError::NotFound(MissingEntity::Workflow(
                workflow_id,
            )))?;
        if is_initial && graph.initial_transition().is_some() {
            return Err(InvariantViolation::DuplicateInitialTransition(workflow_id).into());
        }
        if let Some(src) = src_status {
            self.lookup.status(src).await?;
        }
        self.lookup.status(dest_status).await?;

        let condition_specs = validate_extension_specs("conditions", &conditions)?;
        let postfunction_specs = validate_extension_specs("postfunctions", &postfunctions)?;

        let base = if is_initial {
            Transition::initial(workflow_id, name, dest_status)?
        } else {
            Transition::new(workflow_id, name, src_status, dest_status)?
        };
        let transition = base
            .with_conditions(condition_specs)
            .with_postfunctions(postfunction_specs);

        self.registry().store_transition(&transition).await?;
        info!(
            workflow_id = %workflow_id,
            transition_id = %transition.id(),
            is_initial,
            "transition defined"
        );
        Ok(transition)
    }

    /// Defines a field type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError`] when the key is blank or taken or when a
    /// schema document does not compile.
    pub async fn define_field_type(
        &self,
        key: &str,
        value_schema: Value,
        config_schema: Option<Value>,
    ) -> SchemaServiceResult<FieldType> {
        let owner = format!("field type '{key}'");
        ensure_schema_document(&owner, &value_schema)?;
        let mut field_type = FieldType::new(key, value_schema)?;
        if let Some(schema) = config_schema {
            ensure_schema_document(&owner, &schema)?;
            field_type = field_type.with_config_schema(schema);
        }
        self.registry().store_field_type(&field_type).await?;
        Ok(field_type)
    }

    /// Defines a field after validating its config.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError::SchemaViolation`] when the config fails
    /// the field type's config schema, plus the lookup and naming errors of
    /// the other definitions.
    pub async fn define_field(&self, request: DefineFieldRequest) -> SchemaServiceResult<Field> {
        let DefineFieldRequest {
            field_type_id,
            key,
            name,
            description,
            config,
        } = request;

        let field_type = self
            .registry()
            .find_field_type(field_type_id)
            .await?
            .ok_or(SchemaServiceError::NotFound(MissingEntity::FieldType(
                field_type_id,
            )))?;
        validate_config(&field_type, &key, config.as_ref())?;

        let mut field = Field::new(key, name, field_type)?;
        if let Some(text) = description {
            field = field.with_description(text);
        }
        if let Some(value) = config {
            field = field.with_config(value);
        }
        self.registry().store_field(&field).await?;
        Ok(field)
    }

    /// Defines a screen from existing fields.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError::NotFound`] when a placed field is
    /// unknown.
    pub async fn define_screen(
        &self,
        name: &str,
        placements: &[ScreenFieldRequest],
    ) -> SchemaServiceResult<Screen> {
        let mut fields = Vec::with_capacity(placements.len());
        for placement in placements {
            let field = self.lookup.field(placement.field_id).await?;
            fields.push(ScreenField::new(
                field,
                placement.is_required,
                placement.priority,
            ));
        }
        let screen = Screen::new(name, fields)?;
        self.registry().store_screen(&screen).await?;
        Ok(screen)
    }

    /// Defines a project.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError`] when the key is invalid, or when the
    /// key or the name is taken, or when the name is blank.
    pub async fn define_project(
        &self,
        key: &str,
        name: &str,
        description: Option<&str>,
    ) -> SchemaServiceResult<Project> {
        let mut project = Project::new(key, name)?;
        if let Some(text) = description {
            project = project.with_description(text);
        }
        self.registry().store_project(&project).await?;
        info!(project_id = %project.id(), key = %project.key(), "project defined");
        Ok(project)
    }

    /// Defines a task type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError`] when the name is blank or taken.
    pub async fn define_task_type(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> SchemaServiceResult<TaskType> {
        let mut task_type = TaskType::new(name)?;
        if let Some(text) = description {
            task_type = task_type.with_description(text);
        }
        self.registry().store_task_type(&task_type).await?;
        Ok(task_type)
    }

    /// Defines an inactive project schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError::NotFound`] when a bound entity is
    /// unknown and [`SchemaServiceError::SchemaViolation`] when the listener
    /// specs are malformed.
    pub async fn define_project_schema(
        &self,
        request: DefineProjectSchemaRequest,
    ) -> SchemaServiceResult<ProjectSchema> {
        let DefineProjectSchemaRequest {
            project_id,
            task_type_id,
            workflow_id,
            screen_id,
            event_listeners,
            access,
        } = request;

        self.lookup.project(project_id).await?;
        self.registry()
            .find_task_type(task_type_id)
            .await?
            .ok_or(SchemaServiceError::NotFound(MissingEntity::TaskType(
                task_type_id,
            )))?;
        self.lookup.workflow(workflow_id).await?;
        self.lookup.screen(screen_id).await?;
        let listeners = validate_extension_specs("event_listeners", &event_listeners)?;

        let schema = ProjectSchema::new(project_id, task_type_id, workflow_id, screen_id)
            .with_event_listeners(listeners)
            .with_access(access);
        self.registry().store_project_schema(&schema).await?;
        Ok(schema)
    }

    /// Makes a schema the one new tasks of its project and task type use.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::DuplicateActiveSchema`] when another
    /// schema is already active for the pair.
    pub async fn activate_schema(&self, id: ProjectSchemaId) -> SchemaServiceResult<ProjectSchema> {
        let schema = self.registry().set_schema_active(id, true).await?;
        info!(schema_id = %id, "project schema activated");
        Ok(schema)
    }

    /// Deactivates a schema that no task references.
    ///
    /// The task count and the deactivation are separate steps against two
    /// stores. A `create_task` that resolved the schema as active before the
    /// deactivation commits can still store its task afterwards, leaving a
    /// task bound to an inactive schema. Callers that need the guarantee must
    /// stop task creation for the project before deactivating.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::DeactivationWithTasks`] when tasks still
    /// reference the schema.
    pub async fn deactivate_schema(
        &self,
        id: ProjectSchemaId,
    ) -> SchemaServiceResult<ProjectSchema> {
        self.lookup.project_schema(id).await?;
        if self.tasks.count_by_schema(id).await? > 0 {
            return Err(InvariantViolation::DeactivationWithTasks(id).into());
        }
        let schema = self.registry().set_schema_active(id, false).await?;
        info!(schema_id = %id, "project schema deactivated");
        Ok(schema)
    }

    /// Defines a link type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaServiceError`] when either name is blank.
    pub async fn define_link_type(
        &self,
        src_name: &str,
        dest_name: &str,
    ) -> SchemaServiceResult<LinkType> {
        let link_type = LinkType::new(src_name, dest_name)?;
        self.registry().store_link_type(&link_type).await?;
        Ok(link_type)
    }
}
