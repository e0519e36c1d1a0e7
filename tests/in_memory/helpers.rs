//! Shared tracker setup for in-memory integration tests.

use mockable::DefaultClock;
use rstest::fixture;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use trellis::{
    extension::{
        adapters::ExtensionRegistry,
        domain::{ExtensionArgs, ExtensionError, ExtensionResult, Postfunction},
    },
    identity::{User, UserId},
    schema::{
        adapters::memory::InMemorySchemaRegistry,
        domain::{AccessGroups, Field, ProjectSchema, Status, Transition, Workflow},
        services::{
            DefineFieldRequest, DefineProjectSchemaRequest, DefineTransitionRequest,
            SchemaRegistryService, ScreenFieldRequest,
        },
    },
    task::{
        adapters::memory::InMemoryTaskRepository,
        domain::Task,
        ports::TaskRepository,
        services::{CreateTaskRequest, TaskService, TaskSnapshot},
    },
};

/// Task service over the in-memory registry and the task store `R`.
pub type TestTaskService<R = InMemoryTaskRepository> =
    TaskService<InMemorySchemaRegistry, R, ExtensionRegistry, DefaultClock>;

/// Registry service over the in-memory registry and the task store `R`.
pub type TestSchemaService<R = InMemoryTaskRepository> =
    SchemaRegistryService<InMemorySchemaRegistry, R>;

/// Class reference of the counting postfunction.
pub const COUNT_POSTFUNCTION: &str = "tests.Count";

/// Counts postfunction executions per label.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<Mutex<Vec<String>>>);

impl Counter {
    /// Returns how often `label` ran.
    #[must_use]
    pub fn runs(&self, label: &str) -> usize {
        self.0
            .lock()
            .map(|labels| labels.iter().filter(|seen| *seen == label).count())
            .unwrap_or_default()
    }
}

struct Count {
    label: String,
    counter: Counter,
}

#[async_trait::async_trait]
impl Postfunction for Count {
    async fn execute(&self, _task: &Task, _user: &User) -> ExtensionResult<()> {
        let mut labels = self
            .counter
            .0
            .lock()
            .map_err(|err| ExtensionError::failed(std::io::Error::other(err.to_string())))?;
        labels.push(self.label.clone());
        Ok(())
    }
}

/// Spec JSON for a counting postfunction.
#[must_use]
pub fn count(label: &str, priority: i64) -> Value {
    json!({"class": COUNT_POSTFUNCTION, "kwargs": {"label": label}, "priority": priority})
}

/// A project with an Open, In Progress, Done workflow.
pub struct Tracker<R: TaskRepository = InMemoryTaskRepository> {
    pub schemas: TestSchemaService<R>,
    pub service: TestTaskService<R>,
    pub counter: Counter,
    pub user: User,
    pub workflow: Workflow,
    pub open: Status,
    pub in_progress: Status,
    pub done: Status,
    pub start: Transition,
    pub finish: Transition,
    pub estimate: Field,
    pub schema: ProjectSchema,
}

impl Tracker {
    /// Defines the workflow, an optional integer `estimate` field and an
    /// active schema guarded by `access`, over an in-memory task store.
    ///
    /// # Errors
    ///
    /// Returns an error when any definition is rejected.
    pub async fn build(access: AccessGroups) -> Result<Self, eyre::Report> {
        Self::build_on(access, Arc::new(InMemoryTaskRepository::new())).await
    }
}

impl<R: TaskRepository> Tracker<R> {
    /// Same as [`Tracker::build`] with tasks stored in `tasks`.
    ///
    /// # Errors
    ///
    /// Returns an error when any definition is rejected.
    pub async fn build_on(access: AccessGroups, tasks: Arc<R>) -> Result<Self, eyre::Report> {
        let registry = Arc::new(InMemorySchemaRegistry::new());
        let schemas = SchemaRegistryService::new(Arc::clone(&registry), Arc::clone(&tasks));
        let counter = Counter::default();
        let mut extensions = ExtensionRegistry::with_builtins();
        let shared = counter.clone();
        extensions.register_postfunction(COUNT_POSTFUNCTION, move |args: ExtensionArgs<'_>| {
            Ok(Count {
                label: args.required("label")?,
                counter: shared.clone(),
            })
        });
        let service = TaskService::new(
            Arc::clone(&registry),
            tasks,
            Arc::new(extensions),
            Arc::new(DefaultClock),
        );

        let todo = schemas.define_status_type("To Do").await?;
        let active = schemas.define_status_type("In Flight").await?;
        let complete = schemas.define_status_type("Complete").await?;
        let open = schemas.define_status("Open", todo.id()).await?;
        let in_progress = schemas.define_status("In Progress", active.id()).await?;
        let done = schemas.define_status("Done", complete.id()).await?;

        let workflow = schemas.define_workflow("Simple").await?;
        schemas
            .define_transition(DefineTransitionRequest::initial(
                workflow.id(),
                "Create",
                open.id(),
            ))
            .await?;
        let start = schemas
            .define_transition(DefineTransitionRequest::new(
                workflow.id(),
                "Start",
                Some(open.id()),
                in_progress.id(),
            ))
            .await?;
        let finish = schemas
            .define_transition(
                DefineTransitionRequest::new(
                    workflow.id(),
                    "Finish",
                    Some(in_progress.id()),
                    done.id(),
                )
                .with_postfunctions(json!([count("finish", 0)])),
            )
            .await?;

        let integer = schemas
            .define_field_type("integer", json!({"type": "integer"}), None)
            .await?;
        let estimate = schemas
            .define_field(DefineFieldRequest::new(integer.id(), "estimate", "Estimate"))
            .await?;
        let screen = schemas
            .define_screen(
                "Default",
                &[ScreenFieldRequest {
                    field_id: estimate.id(),
                    is_required: false,
                    priority: 0,
                }],
            )
            .await?;
        let project = schemas.define_project("CORE", "Core", None).await?;
        let task_type = schemas.define_task_type("Task", None).await?;
        let defined = schemas
            .define_project_schema(
                DefineProjectSchemaRequest::new(
                    project.id(),
                    task_type.id(),
                    workflow.id(),
                    screen.id(),
                )
                .with_access(access),
            )
            .await?;
        let schema = schemas.activate_schema(defined.id()).await?;

        Ok(Self {
            schemas,
            service,
            counter,
            user: User::new(UserId::new(), "alice"),
            workflow,
            open,
            in_progress,
            done,
            start,
            finish,
            estimate,
            schema,
        })
    }

    /// Request for a task in this tracker's project.
    #[must_use]
    pub fn request(&self, summary: &str) -> CreateTaskRequest {
        CreateTaskRequest::new(self.schema.project_id(), self.schema.task_type_id(), summary)
    }

    /// Creates a task as the tracker's default user.
    ///
    /// # Errors
    ///
    /// Returns an error when creation fails.
    pub async fn create(&self, summary: &str) -> Result<TaskSnapshot, eyre::Report> {
        Ok(self
            .service
            .create_task(self.request(summary), &self.user)
            .await?)
    }
}

/// Tracker without access restrictions.
///
/// # Errors
///
/// Returns an error when the tracker cannot be set up.
#[fixture]
pub async fn tracker() -> Result<Tracker, eyre::Report> {
    Tracker::build(AccessGroups::default()).await
}
