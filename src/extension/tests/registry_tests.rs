//! Tests for the static extension registry and built-in extensions.

use crate::extension::{
    adapters::{ExtensionRegistry, TRACING_LISTENER, USER_IN_GROUPS},
    domain::{CapabilityKind, Condition, ExtensionError, ExtensionResult, Postfunction},
    ports::{ExtensionResolver, ResolveError},
};
use crate::identity::{GroupId, User, UserId};
use crate::schema::domain::{
    ExtensionSpec, ProjectId, ProjectKey, ProjectSchemaId, StatusId, TaskTypeId,
};
use crate::task::domain::{Summary, Task, TaskKey, TaskNumber, TaskPlacement};
use async_trait::async_trait;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Map, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[fixture]
fn task() -> Task {
    let key = ProjectKey::new("EXT").expect("valid project key");
    let number = TaskNumber::FIRST;
    Task::new(
        TaskPlacement {
            schema_id: ProjectSchemaId::new(),
            project_id: ProjectId::new(),
            task_type_id: TaskTypeId::new(),
            number,
            key: TaskKey::compose(&key, number, 64).expect("key fits"),
            status: StatusId::new(),
        },
        Summary::new("Exercise extensions", 1024).expect("valid summary"),
        UserId::new(),
        &DefaultClock,
    )
}

fn groups_kwarg(groups: &[GroupId]) -> Map<String, serde_json::Value> {
    let mut kwargs = Map::new();
    kwargs.insert("groups".to_owned(), json!(groups));
    kwargs
}

struct Counting {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Postfunction for Counting {
    async fn execute(&self, _task: &Task, _user: &User) -> ExtensionResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn user_in_groups_checks_membership(task: Task) {
    let reviewers = GroupId::new();
    let registry = ExtensionRegistry::with_builtins();
    let spec = ExtensionSpec::new(USER_IN_GROUPS, 0).with_kwargs(groups_kwarg(&[reviewers]));

    let condition = registry
        .resolve_condition(&spec)
        .expect("condition should resolve");

    let member = User::new(UserId::new(), "ada").with_groups([reviewers]);
    let outsider = User::new(UserId::new(), "bob");
    assert!(condition.is_active(&task, &member).await);
    assert!(!condition.is_active(&task, &outsider).await);
}

#[rstest]
fn user_in_groups_requires_groups_kwarg() {
    let registry = ExtensionRegistry::with_builtins();
    let spec = ExtensionSpec::new(USER_IN_GROUPS, 0);

    let result = registry.resolve(&spec);

    assert!(matches!(
        result,
        Err(ResolveError::Construction {
            source: ExtensionError::InvalidArguments(_),
            ..
        })
    ));
}

#[rstest]
fn unknown_class_is_rejected() {
    let registry = ExtensionRegistry::with_builtins();
    let spec = ExtensionSpec::new("acme.conditions.Nope", 0);

    let result = registry.resolve(&spec);

    assert!(matches!(
        result,
        Err(ResolveError::UnknownClass(name)) if name == "acme.conditions.Nope"
    ));
}

#[rstest]
fn wrong_capability_is_rejected() {
    let registry = ExtensionRegistry::with_builtins();
    let spec = ExtensionSpec::new(TRACING_LISTENER, 0);

    let result = registry.resolve_condition(&spec);

    assert!(matches!(
        result,
        Err(ResolveError::WrongCapability {
            expected: CapabilityKind::Condition,
            actual: CapabilityKind::EventListener,
            ..
        })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn each_resolution_builds_a_fresh_instance(task: Task) {
    let constructed = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = ExtensionRegistry::new();
    let constructed_in_factory = Arc::clone(&constructed);
    let calls_in_factory = Arc::clone(&calls);
    registry.register_postfunction("test.Counting", move |_| {
        constructed_in_factory.fetch_add(1, Ordering::SeqCst);
        Ok(Counting {
            calls: Arc::clone(&calls_in_factory),
        })
    });
    let spec = ExtensionSpec::new("test.Counting", 1);
    let user = User::new(UserId::new(), "ada");

    for _ in 0..2 {
        let postfunction = registry
            .resolve_postfunction(&spec)
            .expect("postfunction should resolve");
        postfunction
            .execute(&task, &user)
            .await
            .expect("postfunction should succeed");
    }

    assert_eq!(constructed.load(Ordering::SeqCst), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[rstest]
fn registry_debug_lists_classes() {
    let registry = ExtensionRegistry::with_builtins();
    let rendered = format!("{registry:?}");
    assert!(rendered.contains(TRACING_LISTENER));
    assert!(rendered.contains(USER_IN_GROUPS));
}
