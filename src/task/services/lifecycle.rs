//! Caller-facing task operations.

use super::{
    CreateTaskRequest, EventDispatcher, FieldValueSnapshot, TaskServiceConfig, TaskServiceError,
    TaskServiceResult, TaskSnapshot, TaskSummary, TransitionEngine, TransitionSummary,
    UpdateTaskRequest,
};
use crate::error::MissingEntity;
use crate::extension::ports::ExtensionResolver;
use crate::identity::User;
use crate::permission::{Action, PermissionGate};
use crate::schema::{
    domain::{
        FieldId, InvariantViolation, ProjectId, ProjectSchema, ProjectSchemaId, Screen,
        ScreenField, StatusId, StatusSnapshot, Transition, TransitionId,
    },
    ports::SchemaRegistry,
    services::SchemaLookup,
};
use crate::task::{
    domain::{
        FieldValue, Summary, Task, TaskEvent, TaskId, TaskKey, TaskNumber, TaskPlacement,
    },
    ports::{TaskRepository, TaskUpdate},
};
use crate::validation::{SchemaViolation, validate_value};
use mockable::Clock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Task management service: creation, editing, transitions, deletion and
/// the read views over tasks.
///
/// Every operation checks the caller's permission on the task's schema
/// first. Mutations persist their events in the same store transaction and
/// hand them to the schema's listeners after commit.
pub struct TaskService<S, R, X, C>
where
    S: SchemaRegistry,
    R: TaskRepository,
    X: ExtensionResolver,
    C: Clock + Send + Sync,
{
    pub(super) lookup: SchemaLookup<S>,
    pub(super) tasks: Arc<R>,
    pub(super) engine: TransitionEngine<S, R, X, C>,
    pub(super) dispatcher: EventDispatcher<X>,
    pub(super) gate: PermissionGate,
    pub(super) config: TaskServiceConfig,
    pub(super) clock: Arc<C>,
}

impl<S, R, X, C> Clone for TaskService<S, R, X, C>
where
    S: SchemaRegistry,
    R: TaskRepository,
    X: ExtensionResolver,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            lookup: self.lookup.clone(),
            tasks: Arc::clone(&self.tasks),
            engine: self.engine.clone(),
            dispatcher: self.dispatcher.clone(),
            gate: self.gate,
            config: self.config,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, R, X, C> TaskService<S, R, X, C>
where
    S: SchemaRegistry,
    R: TaskRepository,
    X: ExtensionResolver,
    C: Clock + Send + Sync,
{
    /// Creates a service with default limits.
    #[must_use]
    pub fn new(registry: Arc<S>, tasks: Arc<R>, resolver: Arc<X>, clock: Arc<C>) -> Self {
        Self::with_config(registry, tasks, resolver, clock, TaskServiceConfig::default())
    }

    /// Creates a service with explicit limits.
    #[must_use]
    pub fn with_config(
        registry: Arc<S>,
        tasks: Arc<R>,
        resolver: Arc<X>,
        clock: Arc<C>,
        config: TaskServiceConfig,
    ) -> Self {
        let lookup = SchemaLookup::new(registry);
        let engine = TransitionEngine::new(
            lookup.clone(),
            Arc::clone(&tasks),
            Arc::clone(&resolver),
            Arc::clone(&clock),
        );
        Self {
            lookup,
            tasks,
            engine,
            dispatcher: EventDispatcher::new(resolver),
            gate: PermissionGate,
            config,
            clock,
        }
    }

    /// Returns the transition engine.
    #[must_use]
    pub const fn engine(&self) -> &TransitionEngine<S, R, X, C> {
        &self.engine
    }

    /// Creates a task in the initial status of its schema's workflow.
    ///
    /// The initial transition's conditions and postfunctions are not
    /// evaluated.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::PermissionDenied`] without write access,
    /// [`TaskServiceError::SchemaViolation`] when a field value is invalid,
    /// unknown or a required field is missing, and
    /// [`TaskServiceError::NotFound`] when no schema is active for the
    /// project and task type.
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
        user: &User,
    ) -> TaskServiceResult<TaskSnapshot> {
        let CreateTaskRequest {
            project_id,
            task_type_id,
            summary,
            fields,
        } = request;
        let schema = self.lookup.active_schema(project_id, task_type_id).await?;
        self.gate.check(user, &schema, Action::Write)?;

        let project = self.lookup.project(project_id).await?;
        let graph = self.lookup.workflow(schema.workflow_id()).await?;
        let screen = self.lookup.screen(schema.screen_id()).await?;
        let summary = Summary::new(summary, self.config.max_summary_length)?;
        let provided = validated_initial_values(&screen, fields)?;
        let status = graph
            .initial_transition()
            .map(Transition::dest_status)
            .ok_or(TaskServiceError::InvariantViolation(
                InvariantViolation::MissingInitialTransition(schema.workflow_id()),
            ))?;

        let number = match self.tasks.max_task_number(project_id).await? {
            Some(current) => current.next()?,
            None => TaskNumber::FIRST,
        };
        let key = TaskKey::compose(project.key(), number, self.config.max_task_key_length)?;
        let placement = TaskPlacement {
            schema_id: schema.id(),
            project_id,
            task_type_id,
            number,
            key,
            status,
        };
        let task = Task::new(placement, summary, user.id(), &*self.clock);
        let values: Vec<FieldValue> = provided
            .into_iter()
            .map(|(field_id, value)| FieldValue::new(task.id(), field_id, value))
            .collect();
        let events = vec![TaskEvent::task_created(task.id(), user.id(), &*self.clock)];

        self.tasks.insert_task(&task, &values, &events).await?;
        info!(task_id = %task.id(), task_key = %task.key(), user = %user.id(), "task created");

        self.dispatcher.dispatch(&schema, &task, &events, user).await;
        self.snapshot(task, &screen).await
    }

    /// Edits the summary and field values of a task.
    ///
    /// Only values that change produce events; an update that changes
    /// nothing writes nothing. The summary is written only when the request
    /// changes it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::SchemaViolation`] when a value is invalid,
    /// targets a field off the task's screen, or clears a required field,
    /// and [`TaskServiceError::EditConflict`] when another edit committed
    /// while this one was being computed. Nothing is written in either
    /// case.
    pub async fn update_task(
        &self,
        task_id: TaskId,
        request: UpdateTaskRequest,
        user: &User,
    ) -> TaskServiceResult<TaskSnapshot> {
        let (task, schema) = self.load(task_id).await?;
        self.gate.check(user, &schema, Action::Write)?;
        let screen = self.lookup.screen(schema.screen_id()).await?;

        let expected_revision = task.revision();
        let mut edited = task.clone();
        let mut renamed = None;
        let mut events = Vec::new();
        if let Some(raw) = request.summary {
            let summary = Summary::new(raw, self.config.max_summary_length)?;
            if let Some(previous) = edited.rename(summary, &*self.clock) {
                events.push(TaskEvent::summary_updated(
                    task_id,
                    previous.as_str(),
                    edited.summary().as_str(),
                    user.id(),
                    &*self.clock,
                ));
                renamed = Some(edited.summary().clone());
            }
        }

        let mut current: HashMap<FieldId, Value> = self
            .tasks
            .field_values(task_id)
            .await?
            .into_iter()
            .map(|value| (value.field_id(), value.into_value()))
            .collect();
        let mut upserts = Vec::new();
        let mut clears = Vec::new();
        for (field_id, value) in request.fields {
            let entry = screen
                .find_field(field_id)
                .ok_or(SchemaViolation::UnknownField(field_id))?;
            let field = entry.field();
            if value.is_null() {
                if entry.is_required() {
                    return Err(SchemaViolation::RequiredFieldMissing {
                        field_key: field.key().to_owned(),
                    }
                    .into());
                }
                if let Some(old) = current.remove(&field_id) {
                    clears.push(field_id);
                    events.push(TaskEvent::field_updated(
                        task_id,
                        field.snapshot(),
                        (Some(old), None),
                        user.id(),
                        &*self.clock,
                    ));
                }
                continue;
            }

            validate_value(field, &value)?;
            let old = current.get(&field_id).cloned();
            if old.as_ref() == Some(&value) {
                continue;
            }
            current.insert(field_id, value.clone());
            upserts.push(FieldValue::new(task_id, field_id, value.clone()));
            events.push(TaskEvent::field_updated(
                task_id,
                field.snapshot(),
                (old, Some(value)),
                user.id(),
                &*self.clock,
            ));
        }

        if events.is_empty() {
            debug!(task_id = %task_id, "update changed nothing");
            return self.snapshot(task, &screen).await;
        }
        let update = TaskUpdate {
            task_id,
            expected_revision,
            summary: renamed,
            updated_at: self.clock.utc(),
            upserts,
            clears,
            events,
        };
        self.tasks.apply_update(&update).await?;
        info!(
            task_id = %task_id,
            changes = update.events.len(),
            revision = expected_revision.saturating_add(1),
            user = %user.id(),
            "task updated"
        );

        let refreshed = self.require_task(task_id).await?;
        self.dispatcher
            .dispatch(&schema, &refreshed, &update.events, user)
            .await;
        self.snapshot(refreshed, &screen).await
    }

    /// Returns the transitions `user` may currently take on the task.
    ///
    /// Listing has no side effects; repeated calls return the same result
    /// while the task and its schema are unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::PermissionDenied`] without read access.
    pub async fn list_eligible_transitions(
        &self,
        task_id: TaskId,
        user: &User,
    ) -> TaskServiceResult<Vec<TransitionSummary>> {
        let (task, schema) = self.load(task_id).await?;
        self.gate.check(user, &schema, Action::Read)?;
        let eligible = self.engine.list_eligible(&task, user).await?;
        Ok(eligible.iter().map(TransitionSummary::from).collect())
    }

    /// Moves the task through `transition_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::PermissionDenied`] without write access
    /// and [`TaskServiceError::TransitionNotAllowed`] when the transition is
    /// not eligible or a concurrent transition won the race.
    pub async fn execute_transition(
        &self,
        task_id: TaskId,
        transition_id: TransitionId,
        user: &User,
    ) -> TaskServiceResult<()> {
        let (_, schema) = self.load(task_id).await?;
        self.gate.check(user, &schema, Action::Write)?;
        self.engine.execute(task_id, transition_id, user).await?;
        Ok(())
    }

    /// Deletes a task with its field values and events.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::PermissionDenied`] without delete access
    /// and [`TaskServiceError::InvariantViolation`] while links still
    /// reference the task.
    pub async fn delete_task(&self, task_id: TaskId, user: &User) -> TaskServiceResult<()> {
        let (task, schema) = self.load(task_id).await?;
        self.gate.check(user, &schema, Action::Delete)?;
        self.tasks.delete(task_id).await?;
        info!(task_id = %task_id, task_key = %task.key(), user = %user.id(), "task deleted");
        Ok(())
    }

    /// Returns the task with its status, screen fields and links.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] for an unknown task and
    /// [`TaskServiceError::PermissionDenied`] without read access.
    pub async fn get_task(&self, task_id: TaskId, user: &User) -> TaskServiceResult<TaskSnapshot> {
        let (task, schema) = self.load(task_id).await?;
        self.gate.check(user, &schema, Action::Read)?;
        let screen = self.lookup.screen(schema.screen_id()).await?;
        self.snapshot(task, &screen).await
    }

    /// Lists the project's tasks the user may read, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] for an unknown project.
    pub async fn list_tasks(
        &self,
        project_id: ProjectId,
        user: &User,
    ) -> TaskServiceResult<Vec<TaskSummary>> {
        self.lookup.project(project_id).await?;
        let mut readable: HashMap<ProjectSchemaId, bool> = HashMap::new();
        let mut statuses: HashMap<StatusId, StatusSnapshot> = HashMap::new();
        let mut summaries = Vec::new();
        for task in self.tasks.list_by_project(project_id).await? {
            let allowed = match readable.get(&task.schema_id()) {
                Some(allowed) => *allowed,
                None => {
                    let schema = self.lookup.project_schema(task.schema_id()).await?;
                    let allowed = self.gate.allows(user, &schema, Action::Read);
                    readable.insert(task.schema_id(), allowed);
                    allowed
                }
            };
            if !allowed {
                continue;
            }
            let status = match statuses.get(&task.status()) {
                Some(status) => status.clone(),
                None => {
                    let snapshot = self.lookup.status(task.status()).await?.snapshot();
                    statuses.insert(task.status(), snapshot.clone());
                    snapshot
                }
            };
            summaries.push(TaskSummary {
                id: task.id(),
                key: task.key().clone(),
                summary: task.summary().as_str().to_owned(),
                status,
                created_at: task.created_at(),
            });
        }
        Ok(summaries)
    }

    /// Returns the task's events, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::PermissionDenied`] without read access.
    pub async fn task_events(
        &self,
        task_id: TaskId,
        user: &User,
    ) -> TaskServiceResult<Vec<TaskEvent>> {
        let (_, schema) = self.load(task_id).await?;
        self.gate.check(user, &schema, Action::Read)?;
        Ok(self.tasks.events(task_id).await?)
    }

    /// Returns the fields of the task's screen ordered by priority.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::PermissionDenied`] without read access.
    pub async fn task_fields(
        &self,
        task_id: TaskId,
        user: &User,
    ) -> TaskServiceResult<Vec<ScreenField>> {
        let (_, schema) = self.load(task_id).await?;
        self.gate.check(user, &schema, Action::Read)?;
        let screen = self.lookup.screen(schema.screen_id()).await?;
        Ok(screen.fields().to_vec())
    }

    /// Returns every transition of the task's workflow, eligible or not.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::PermissionDenied`] without read access.
    pub async fn task_workflow(
        &self,
        task_id: TaskId,
        user: &User,
    ) -> TaskServiceResult<Vec<TransitionSummary>> {
        let (_, schema) = self.load(task_id).await?;
        self.gate.check(user, &schema, Action::Read)?;
        let graph = self.lookup.workflow(schema.workflow_id()).await?;
        Ok(graph.transitions().iter().map(TransitionSummary::from).collect())
    }

    pub(super) async fn require_task(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskServiceError::NotFound(MissingEntity::Task(task_id)))
    }

    pub(super) async fn load(&self, task_id: TaskId) -> TaskServiceResult<(Task, ProjectSchema)> {
        let task = self.require_task(task_id).await?;
        let schema = self.lookup.project_schema(task.schema_id()).await?;
        Ok((task, schema))
    }

    async fn snapshot(&self, task: Task, screen: &Screen) -> TaskServiceResult<TaskSnapshot> {
        let status = self.lookup.status(task.status()).await?.snapshot();
        let mut values: HashMap<FieldId, Value> = self
            .tasks
            .field_values(task.id())
            .await?
            .into_iter()
            .map(|value| (value.field_id(), value.into_value()))
            .collect();
        let fields = screen
            .fields()
            .iter()
            .map(|entry| FieldValueSnapshot {
                field: entry.field().snapshot(),
                is_required: entry.is_required(),
                value: values.remove(&entry.field().id()),
            })
            .collect();
        let (outward_links, inward_links) = self
            .tasks
            .links_for(task.id())
            .await?
            .into_iter()
            .partition(|link| link.src_task_id() == task.id());
        Ok(TaskSnapshot {
            task,
            status,
            fields,
            outward_links,
            inward_links,
        })
    }
}

/// Validates the values supplied at creation against the screen.
///
/// `null` values count as absent. Every required field must end up with a
/// value.
fn validated_initial_values(
    screen: &Screen,
    fields: Vec<(FieldId, Value)>,
) -> TaskServiceResult<Vec<(FieldId, Value)>> {
    let mut provided = Vec::with_capacity(fields.len());
    for (field_id, value) in fields {
        let entry = screen
            .find_field(field_id)
            .ok_or(SchemaViolation::UnknownField(field_id))?;
        if value.is_null() {
            continue;
        }
        validate_value(entry.field(), &value)?;
        provided.push((field_id, value));
    }
    if let Some(missing) = screen
        .required_fields()
        .find(|field| !provided.iter().any(|(id, _)| *id == field.id()))
    {
        return Err(SchemaViolation::RequiredFieldMissing {
            field_key: missing.key().to_owned(),
        }
        .into());
    }
    Ok(provided)
}
