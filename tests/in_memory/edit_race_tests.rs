//! Concurrent edits of one task through the public task service.

use super::helpers::Tracker;
use async_trait::async_trait;
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Semaphore;
use trellis::{
    error::ErrorClass,
    schema::domain::{AccessGroups, ProjectId, ProjectSchemaId, StatusId},
    task::{
        adapters::memory::InMemoryTaskRepository,
        domain::{FieldValue, Link, LinkId, Task, TaskEvent, TaskEventType, TaskId, TaskNumber},
        ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskUpdate},
        services::{TaskServiceError, UpdateTaskRequest},
    },
};

/// In-memory store that parks edits leaving the summary alone until
/// released, so other edits can commit in between.
#[derive(Debug)]
struct ParkedEdits {
    inner: InMemoryTaskRepository,
    parked: Semaphore,
    release: Semaphore,
}

impl ParkedEdits {
    fn new() -> Self {
        Self {
            inner: InMemoryTaskRepository::new(),
            parked: Semaphore::new(0),
            release: Semaphore::new(0),
        }
    }

    async fn wait_until_parked(&self) -> Result<(), eyre::Report> {
        self.parked.acquire().await?.forget();
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for ParkedEdits {
    async fn insert_task(
        &self,
        task: &Task,
        values: &[FieldValue],
        events: &[TaskEvent],
    ) -> TaskRepositoryResult<()> {
        self.inner.insert_task(task, values, events).await
    }

    async fn max_task_number(
        &self,
        project_id: ProjectId,
    ) -> TaskRepositoryResult<Option<TaskNumber>> {
        self.inner.max_task_number(project_id).await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.inner.find_by_id(id).await
    }

    async fn list_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.list_by_project(project_id).await
    }

    async fn count_by_schema(&self, schema_id: ProjectSchemaId) -> TaskRepositoryResult<u64> {
        self.inner.count_by_schema(schema_id).await
    }

    async fn field_values(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<FieldValue>> {
        self.inner.field_values(task_id).await
    }

    async fn events(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskEvent>> {
        self.inner.events(task_id).await
    }

    async fn apply_update(&self, update: &TaskUpdate) -> TaskRepositoryResult<()> {
        if update.summary.is_none() {
            self.parked.add_permits(1);
            self.release
                .acquire()
                .await
                .map_err(TaskRepositoryError::persistence)?
                .forget();
        }
        self.inner.apply_update(update).await
    }

    async fn commit_status_change(
        &self,
        task: &Task,
        expected: StatusId,
        event: &TaskEvent,
    ) -> TaskRepositoryResult<()> {
        self.inner.commit_status_change(task, expected, event).await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.inner.delete(id).await
    }

    async fn insert_link(&self, link: &Link, event: &TaskEvent) -> TaskRepositoryResult<()> {
        self.inner.insert_link(link, event).await
    }

    async fn find_link(&self, id: LinkId) -> TaskRepositoryResult<Option<Link>> {
        self.inner.find_link(id).await
    }

    async fn delete_link(&self, id: LinkId, event: &TaskEvent) -> TaskRepositoryResult<()> {
        self.inner.delete_link(id, event).await
    }

    async fn links_for(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Link>> {
        self.inner.links_for(task_id).await
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rename_committed_during_a_field_edit_survives() -> Result<(), eyre::Report> {
    let store = Arc::new(ParkedEdits::new());
    let tracker = Tracker::build_on(AccessGroups::default(), Arc::clone(&store)).await?;
    let created = tracker
        .service
        .create_task(
            tracker
                .request("old title")
                .with_field(tracker.estimate.id(), json!(3)),
            &tracker.user,
        )
        .await?;
    let id = created.task.id();

    let estimating = tokio::spawn({
        let service = tracker.service.clone();
        let user = tracker.user.clone();
        let estimate = tracker.estimate.id();
        async move {
            service
                .update_task(id, UpdateTaskRequest::new().with_field(estimate, json!(5)), &user)
                .await
        }
    });
    store.wait_until_parked().await?;
    tracker
        .service
        .update_task(id, UpdateTaskRequest::new().with_summary("new title"), &tracker.user)
        .await?;
    store.release.add_permits(1);
    let stale = estimating.await?;

    let err = stale.expect_err("the field edit was computed before the rename");
    assert!(matches!(err, TaskServiceError::EditConflict(task_id) if task_id == id));
    assert_eq!(err.class(), ErrorClass::Client);

    let current = tracker.service.get_task(id, &tracker.user).await?;
    assert_eq!(current.task.summary().as_str(), "new title");
    assert_eq!(current.value_of("estimate"), Some(&json!(3)));
    let events = tracker.service.task_events(id, &tracker.user).await?;
    let kinds: Vec<TaskEventType> = events.iter().map(TaskEvent::event_type).collect();
    assert_eq!(
        kinds,
        vec![TaskEventType::SummaryUpdated, TaskEventType::TaskCreated]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn racing_field_edits_commit_once_against_the_value_read() -> Result<(), eyre::Report> {
    let store = Arc::new(ParkedEdits::new());
    let tracker = Tracker::build_on(AccessGroups::default(), Arc::clone(&store)).await?;
    let created = tracker
        .service
        .create_task(
            tracker
                .request("Estimate me")
                .with_field(tracker.estimate.id(), json!(3)),
            &tracker.user,
        )
        .await?;
    let id = created.task.id();

    let first = tokio::spawn({
        let service = tracker.service.clone();
        let user = tracker.user.clone();
        let estimate = tracker.estimate.id();
        async move {
            service
                .update_task(id, UpdateTaskRequest::new().with_field(estimate, json!(5)), &user)
                .await
        }
    });
    store.wait_until_parked().await?;
    let second = tokio::spawn({
        let service = tracker.service.clone();
        let user = tracker.user.clone();
        let estimate = tracker.estimate.id();
        async move {
            service
                .update_task(id, UpdateTaskRequest::new().with_field(estimate, json!(8)), &user)
                .await
        }
    });
    store.wait_until_parked().await?;
    store.release.add_permits(2);
    let outcomes = [first.await?, second.await?];

    let conflicts = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Err(TaskServiceError::EditConflict(_))))
        .count();
    assert_eq!(conflicts, 1);
    let winner = outcomes
        .iter()
        .find_map(|outcome| outcome.as_ref().ok())
        .ok_or_else(|| eyre::eyre!("one edit should commit"))?;
    let committed = winner.value_of("estimate").cloned();

    let events = tracker.service.task_events(id, &tracker.user).await?;
    let updates: Vec<&TaskEvent> = events
        .iter()
        .filter(|event| event.event_type() == TaskEventType::TaskUpdated)
        .collect();
    assert_eq!(updates.len(), 1);
    let update = updates
        .first()
        .ok_or_else(|| eyre::eyre!("one update event"))?;
    assert_eq!(update.old_value(), Some(&json!(3)));
    assert_eq!(update.new_value(), committed.as_ref());
    Ok(())
}
