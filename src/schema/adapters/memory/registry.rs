//! In-memory schema registry for tests and embedded use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::MissingEntity;
use crate::schema::{
    domain::{
        Field, FieldId, FieldType, FieldTypeId, InvariantViolation, LinkType, LinkTypeId,
        Project, ProjectId, ProjectSchema, ProjectSchemaId, Screen, ScreenId, Status, StatusId,
        StatusType, StatusTypeId, TaskType, TaskTypeId, Transition, Workflow, WorkflowGraph,
        WorkflowId,
    },
    ports::{SchemaRegistry, SchemaRegistryError, SchemaRegistryResult},
};

/// Thread-safe in-memory schema registry.
#[derive(Debug, Clone, Default)]
pub struct InMemorySchemaRegistry {
    state: Arc<RwLock<InMemorySchemaState>>,
}

#[derive(Debug, Default)]
struct InMemorySchemaState {
    status_types: HashMap<StatusTypeId, StatusType>,
    statuses: HashMap<StatusId, Status>,
    workflows: HashMap<WorkflowId, Workflow>,
    transitions: HashMap<WorkflowId, Vec<Transition>>,
    field_types: HashMap<FieldTypeId, FieldType>,
    fields: HashMap<FieldId, Field>,
    screens: HashMap<ScreenId, Screen>,
    projects: HashMap<ProjectId, Project>,
    task_types: HashMap<TaskTypeId, TaskType>,
    schemas: HashMap<ProjectSchemaId, ProjectSchema>,
    link_types: Vec<LinkType>,
}

impl InMemorySchemaRegistry {
    /// Creates an empty in-memory registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> SchemaRegistryResult<RwLockReadGuard<'_, InMemorySchemaState>> {
        self.state.read().map_err(|err| {
            SchemaRegistryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> SchemaRegistryResult<RwLockWriteGuard<'_, InMemorySchemaState>> {
        self.state.write().map_err(|err| {
            SchemaRegistryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Fails with `DuplicateName` when any existing value carries `name`.
fn ensure_unique<'a, T: 'a>(
    kind: &'static str,
    name: &str,
    existing: impl IntoIterator<Item = &'a T>,
    name_of: impl Fn(&T) -> &str,
) -> SchemaRegistryResult<()> {
    if existing.into_iter().any(|value| name_of(value) == name) {
        return Err(SchemaRegistryError::DuplicateName {
            kind,
            name: name.to_owned(),
        });
    }
    Ok(())
}

/// Fails when `candidate` is active and another active schema binds its pair.
fn ensure_single_active(
    state: &InMemorySchemaState,
    candidate: &ProjectSchema,
) -> SchemaRegistryResult<()> {
    if !candidate.is_active() {
        return Ok(());
    }
    let conflict = state.schemas.values().any(|existing| {
        existing.id() != candidate.id() && existing.is_active() && existing.binds_same_pair(candidate)
    });
    if conflict {
        return Err(InvariantViolation::DuplicateActiveSchema {
            project_id: candidate.project_id(),
            task_type_id: candidate.task_type_id(),
        }
        .into());
    }
    Ok(())
}

#[async_trait]
impl SchemaRegistry for InMemorySchemaRegistry {
    async fn store_status_type(&self, status_type: &StatusType) -> SchemaRegistryResult<()> {
        let mut state = self.write()?;
        ensure_unique(
            "status type",
            status_type.name(),
            state.status_types.values(),
            StatusType::name,
        )?;
        state
            .status_types
            .insert(status_type.id(), status_type.clone());
        Ok(())
    }

    async fn find_status_type(
        &self,
        id: StatusTypeId,
    ) -> SchemaRegistryResult<Option<StatusType>> {
        Ok(self.read()?.status_types.get(&id).cloned())
    }

    async fn store_status(&self, status: &Status) -> SchemaRegistryResult<()> {
        let mut state = self.write()?;
        ensure_unique("status", status.name(), state.statuses.values(), Status::name)?;
        state.statuses.insert(status.id(), status.clone());
        Ok(())
    }

    async fn find_status(&self, id: StatusId) -> SchemaRegistryResult<Option<Status>> {
        Ok(self.read()?.statuses.get(&id).cloned())
    }

    async fn store_workflow(&self, workflow: &Workflow) -> SchemaRegistryResult<()> {
        let mut state = self.write()?;
        ensure_unique(
            "workflow",
            workflow.name(),
            state.workflows.values(),
            Workflow::name,
        )?;
        state.workflows.insert(workflow.id(), workflow.clone());
        state.transitions.entry(workflow.id()).or_default();
        Ok(())
    }

    async fn store_transition(&self, transition: &Transition) -> SchemaRegistryResult<()> {
        let workflow_id = transition.workflow_id();
        let mut state = self.write()?;
        let transitions = state
            .transitions
            .get_mut(&workflow_id)
            .ok_or(SchemaRegistryError::NotFound(MissingEntity::Workflow(
                workflow_id,
            )))?;
        if transition.is_initial() && transitions.iter().any(Transition::is_initial) {
            return Err(InvariantViolation::DuplicateInitialTransition(workflow_id).into());
        }
        transitions.push(transition.clone());
        Ok(())
    }

    async fn find_workflow(&self, id: WorkflowId) -> SchemaRegistryResult<Option<WorkflowGraph>> {
        let state = self.read()?;
        let graph = state.workflows.get(&id).map(|workflow| {
            let transitions = state.transitions.get(&id).cloned().unwrap_or_default();
            WorkflowGraph::new(workflow.clone(), transitions)
        });
        Ok(graph)
    }

    async fn store_field_type(&self, field_type: &FieldType) -> SchemaRegistryResult<()> {
        let mut state = self.write()?;
        ensure_unique(
            "field type",
            field_type.key(),
            state.field_types.values(),
            FieldType::key,
        )?;
        state.field_types.insert(field_type.id(), field_type.clone());
        Ok(())
    }

    async fn find_field_type(&self, id: FieldTypeId) -> SchemaRegistryResult<Option<FieldType>> {
        Ok(self.read()?.field_types.get(&id).cloned())
    }

    async fn store_field(&self, field: &Field) -> SchemaRegistryResult<()> {
        let mut state = self.write()?;
        ensure_unique("field", field.key(), state.fields.values(), Field::key)?;
        state.fields.insert(field.id(), field.clone());
        Ok(())
    }

    async fn find_field(&self, id: FieldId) -> SchemaRegistryResult<Option<Field>> {
        Ok(self.read()?.fields.get(&id).cloned())
    }

    async fn store_screen(&self, screen: &Screen) -> SchemaRegistryResult<()> {
        self.write()?.screens.insert(screen.id(), screen.clone());
        Ok(())
    }

    async fn find_screen(&self, id: ScreenId) -> SchemaRegistryResult<Option<Screen>> {
        Ok(self.read()?.screens.get(&id).cloned())
    }

    async fn store_project(&self, project: &Project) -> SchemaRegistryResult<()> {
        let mut state = self.write()?;
        ensure_unique(
            "project",
            project.key().as_str(),
            state.projects.values(),
            |existing: &Project| existing.key().as_str(),
        )?;
        ensure_unique(
            "project name",
            project.name(),
            state.projects.values(),
            Project::name,
        )?;
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn find_project(&self, id: ProjectId) -> SchemaRegistryResult<Option<Project>> {
        Ok(self.read()?.projects.get(&id).cloned())
    }

    async fn store_task_type(&self, task_type: &TaskType) -> SchemaRegistryResult<()> {
        let mut state = self.write()?;
        ensure_unique(
            "task type",
            task_type.name(),
            state.task_types.values(),
            TaskType::name,
        )?;
        state.task_types.insert(task_type.id(), task_type.clone());
        Ok(())
    }

    async fn find_task_type(&self, id: TaskTypeId) -> SchemaRegistryResult<Option<TaskType>> {
        Ok(self.read()?.task_types.get(&id).cloned())
    }

    async fn store_project_schema(&self, schema: &ProjectSchema) -> SchemaRegistryResult<()> {
        let mut state = self.write()?;
        ensure_single_active(&state, schema)?;
        state.schemas.insert(schema.id(), schema.clone());
        Ok(())
    }

    async fn set_schema_active(
        &self,
        id: ProjectSchemaId,
        is_active: bool,
    ) -> SchemaRegistryResult<ProjectSchema> {
        let mut state = self.write()?;
        let updated = state
            .schemas
            .get(&id)
            .ok_or(SchemaRegistryError::NotFound(MissingEntity::ProjectSchema(
                id,
            )))?
            .clone()
            .with_active(is_active);
        ensure_single_active(&state, &updated)?;
        state.schemas.insert(id, updated.clone());
        Ok(updated)
    }

    async fn find_project_schema(
        &self,
        id: ProjectSchemaId,
    ) -> SchemaRegistryResult<Option<ProjectSchema>> {
        Ok(self.read()?.schemas.get(&id).cloned())
    }

    async fn active_schemas(
        &self,
        project_id: ProjectId,
        task_type_id: TaskTypeId,
    ) -> SchemaRegistryResult<Vec<ProjectSchema>> {
        let state = self.read()?;
        Ok(state
            .schemas
            .values()
            .filter(|schema| {
                schema.is_active()
                    && schema.project_id() == project_id
                    && schema.task_type_id() == task_type_id
            })
            .cloned()
            .collect())
    }

    async fn store_link_type(&self, link_type: &LinkType) -> SchemaRegistryResult<()> {
        self.write()?.link_types.push(link_type.clone());
        Ok(())
    }

    async fn find_link_type(&self, id: LinkTypeId) -> SchemaRegistryResult<Option<LinkType>> {
        let state = self.read()?;
        Ok(state
            .link_types
            .iter()
            .find(|link_type| link_type.id() == id)
            .cloned())
    }

    async fn list_link_types(&self) -> SchemaRegistryResult<Vec<LinkType>> {
        Ok(self.read()?.link_types.clone())
    }
}
