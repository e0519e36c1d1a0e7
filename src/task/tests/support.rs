//! Shared fixture: an Open / In Progress / Done workflow wired to in-memory
//! stores and a set of recording test extensions.

use crate::extension::{
    adapters::ExtensionRegistry,
    domain::{
        Condition, EventListener, ExtensionArgs, ExtensionError, ExtensionResult, Postfunction,
    },
};
use crate::identity::{User, UserId};
use crate::schema::{
    adapters::memory::InMemorySchemaRegistry,
    domain::{AccessGroups, Field, ProjectSchema, Status, TaskType, Transition, Workflow},
    services::{
        DefineFieldRequest, DefineProjectSchemaRequest, DefineTransitionRequest,
        SchemaRegistryService, ScreenFieldRequest,
    },
};
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, TaskEvent},
    services::{CreateTaskRequest, TaskService, TaskSnapshot},
};
use async_trait::async_trait;
use mockable::DefaultClock;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

pub type TestTaskService =
    TaskService<InMemorySchemaRegistry, InMemoryTaskRepository, ExtensionRegistry, DefaultClock>;
pub type TestSchemaService = SchemaRegistryService<InMemorySchemaRegistry, InMemoryTaskRepository>;

/// Ordered record of extension activity.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: String) {
        self.0.lock().expect("journal lock").push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("journal lock").clone()
    }

    pub fn clear(&self) {
        self.0.lock().expect("journal lock").clear();
    }
}

fn label(args: ExtensionArgs<'_>) -> Result<String, ExtensionError> {
    args.required("label")
}

struct Guard {
    label: String,
    result: bool,
    journal: Journal,
}

#[async_trait]
impl Condition for Guard {
    async fn is_active(&self, _task: &Task, _user: &User) -> bool {
        self.journal.push(format!("condition:{}", self.label));
        self.result
    }
}

struct Recorder {
    label: String,
    fail: bool,
    journal: Journal,
}

#[async_trait]
impl Postfunction for Recorder {
    async fn execute(&self, task: &Task, _user: &User) -> ExtensionResult<()> {
        self.journal
            .push(format!("post:{}:{}", self.label, task.status()));
        if self.fail {
            return Err(ExtensionError::failed(std::io::Error::other("boom")));
        }
        Ok(())
    }
}

struct Listener {
    label: String,
    fail: bool,
    journal: Journal,
}

#[async_trait]
impl EventListener for Listener {
    async fn notify(&self, _task: &Task, events: &[TaskEvent], _user: &User) -> ExtensionResult<()> {
        let kinds: Vec<&str> = events.iter().map(|event| event.event_type().as_str()).collect();
        self.journal
            .push(format!("listener:{}:{}", self.label, kinds.join(",")));
        if self.fail {
            return Err(ExtensionError::failed(std::io::Error::other("listener down")));
        }
        Ok(())
    }
}

/// Registry holding the built-ins plus the recording test extensions.
pub fn test_extensions(journal: &Journal) -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::with_builtins();
    let guard_journal = journal.clone();
    registry.register_condition("test.Guard", move |args| {
        Ok(Guard {
            label: label(args)?,
            result: args.required("result")?,
            journal: guard_journal.clone(),
        })
    });
    for (class_ref, fail) in [("test.Record", false), ("test.Explode", true)] {
        let post_journal = journal.clone();
        registry.register_postfunction(class_ref, move |args| {
            Ok(Recorder {
                label: label(args)?,
                fail,
                journal: post_journal.clone(),
            })
        });
    }
    for (class_ref, fail) in [("test.Listen", false), ("test.Deaf", true)] {
        let listener_journal = journal.clone();
        registry.register_listener(class_ref, move |args| {
            Ok(Listener {
                label: label(args)?,
                fail,
                journal: listener_journal.clone(),
            })
        });
    }
    registry
}

/// Raw JSON for a guard condition.
pub fn guard(label: &str, result: bool, priority: i64) -> Value {
    json!({"class": "test.Guard", "kwargs": {"label": label, "result": result}, "priority": priority})
}

/// Raw JSON for a recording postfunction.
pub fn record(label: &str, priority: i64) -> Value {
    json!({"class": "test.Record", "kwargs": {"label": label}, "priority": priority})
}

pub struct Fixture {
    pub registry: Arc<InMemorySchemaRegistry>,
    pub tasks: Arc<InMemoryTaskRepository>,
    pub schemas: TestSchemaService,
    pub service: TestTaskService,
    pub journal: Journal,
    pub user: User,
    pub workflow: Workflow,
    pub open: Status,
    pub in_progress: Status,
    pub done: Status,
    pub start: Transition,
    pub finish: Transition,
    pub reopen: Transition,
    pub severity: Field,
    pub points: Field,
    pub task_type: TaskType,
    pub schema: ProjectSchema,
}

impl Fixture {
    pub async fn build() -> Self {
        let registry = Arc::new(InMemorySchemaRegistry::new());
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let schemas = SchemaRegistryService::new(Arc::clone(&registry), Arc::clone(&tasks));
        let journal = Journal::default();
        let service = TaskService::new(
            Arc::clone(&registry),
            Arc::clone(&tasks),
            Arc::new(test_extensions(&journal)),
            Arc::new(DefaultClock),
        );

        let todo = schemas.define_status_type("To Do").await.expect("status type");
        let active = schemas.define_status_type("Active").await.expect("status type");
        let closed = schemas.define_status_type("Closed").await.expect("status type");
        let open = schemas.define_status("Open", todo.id()).await.expect("status");
        let in_progress = schemas
            .define_status("In Progress", active.id())
            .await
            .expect("status");
        let done = schemas.define_status("Done", closed.id()).await.expect("status");

        let workflow = schemas.define_workflow("Delivery").await.expect("workflow");
        schemas
            .define_transition(DefineTransitionRequest::initial(
                workflow.id(),
                "Create",
                open.id(),
            ))
            .await
            .expect("initial transition");
        let start = schemas
            .define_transition(DefineTransitionRequest::new(
                workflow.id(),
                "Start",
                Some(open.id()),
                in_progress.id(),
            ))
            .await
            .expect("start transition");
        let finish = schemas
            .define_transition(
                DefineTransitionRequest::new(
                    workflow.id(),
                    "Finish",
                    Some(in_progress.id()),
                    done.id(),
                )
                .with_postfunctions(json!([record("finish", 0)])),
            )
            .await
            .expect("finish transition");
        let reopen = schemas
            .define_transition(DefineTransitionRequest::new(
                workflow.id(),
                "Reopen",
                None,
                open.id(),
            ))
            .await
            .expect("reopen transition");

        let text = schemas
            .define_field_type(
                "severity",
                json!({"type": "string", "enum": ["low", "high"]}),
                None,
            )
            .await
            .expect("field type");
        let number = schemas
            .define_field_type("points", json!({"type": "integer", "minimum": 0}), None)
            .await
            .expect("field type");
        let severity = schemas
            .define_field(DefineFieldRequest::new(text.id(), "severity", "Severity"))
            .await
            .expect("field");
        let points = schemas
            .define_field(DefineFieldRequest::new(number.id(), "points", "Story points"))
            .await
            .expect("field");
        let screen = schemas
            .define_screen(
                "Default",
                &[
                    ScreenFieldRequest {
                        field_id: points.id(),
                        is_required: false,
                        priority: 2,
                    },
                    ScreenFieldRequest {
                        field_id: severity.id(),
                        is_required: true,
                        priority: 1,
                    },
                ],
            )
            .await
            .expect("screen");

        let project = schemas
            .define_project("OPS", "Operations", None)
            .await
            .expect("project");
        let task_type = schemas.define_task_type("Bug", None).await.expect("task type");
        let defined = schemas
            .define_project_schema(
                DefineProjectSchemaRequest::new(
                    project.id(),
                    task_type.id(),
                    workflow.id(),
                    screen.id(),
                )
                .with_event_listeners(json!([
                    {"class": "test.Listen", "kwargs": {"label": "second"}, "priority": 5},
                    {"class": "test.Deaf", "kwargs": {"label": "first"}, "priority": 1}
                ])),
            )
            .await
            .expect("project schema");
        let schema = schemas.activate_schema(defined.id()).await.expect("activate");

        Self {
            registry,
            tasks,
            schemas,
            service,
            journal,
            user: User::new(UserId::new(), "ada"),
            workflow,
            open,
            in_progress,
            done,
            start,
            finish,
            reopen,
            severity,
            points,
            task_type,
            schema,
        }
    }

    /// Request for a task carrying the required severity.
    pub fn request(&self, summary: &str) -> CreateTaskRequest {
        CreateTaskRequest::new(self.schema.project_id(), self.task_type.id(), summary)
            .with_field(self.severity.id(), json!("low"))
    }

    pub async fn create(&self, summary: &str) -> TaskSnapshot {
        self.service
            .create_task(self.request(summary), &self.user)
            .await
            .expect("task creation should succeed")
    }

    /// Binds a fresh task type of the same project to a schema guarded by
    /// `access` and returns it.
    pub async fn guarded_schema(&self, access: AccessGroups) -> ProjectSchema {
        let task_type = self
            .schemas
            .define_task_type("Restricted", None)
            .await
            .expect("task type");
        let defined = self
            .schemas
            .define_project_schema(
                DefineProjectSchemaRequest::new(
                    self.schema.project_id(),
                    task_type.id(),
                    self.workflow.id(),
                    self.schema.screen_id(),
                )
                .with_access(access),
            )
            .await
            .expect("guarded schema");
        self.schemas
            .activate_schema(defined.id())
            .await
            .expect("activate guarded schema")
    }
}
