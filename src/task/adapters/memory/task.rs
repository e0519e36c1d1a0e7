//! In-memory task repository for tests and embedded use.
//!
//! Every operation runs under a single lock, which makes each aggregate
//! write atomic and serializes status changes and edits on the same task.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::schema::domain::{FieldId, ProjectId, ProjectSchemaId, StatusId};
use crate::task::{
    domain::{FieldValue, Link, LinkId, Task, TaskEvent, TaskId, TaskKey, TaskNumber},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskUpdate},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    key_index: HashMap<TaskKey, TaskId>,
    values: HashMap<TaskId, HashMap<FieldId, FieldValue>>,
    events: HashMap<TaskId, Vec<TaskEvent>>,
    links: Vec<Link>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryTaskState {
    fn task_mut(&mut self, id: TaskId) -> TaskRepositoryResult<&mut Task> {
        self.tasks
            .get_mut(&id)
            .ok_or(TaskRepositoryError::NotFound(id))
    }

    fn record(&mut self, events: impl IntoIterator<Item = TaskEvent>) {
        for event in events {
            self.events.entry(event.task_id()).or_default().push(event);
        }
    }
}

/// Orders tasks newest first, breaking timestamp ties by number.
fn newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|left, right| {
        right
            .created_at()
            .cmp(&left.created_at())
            .then_with(|| right.number().cmp(&left.number()))
    });
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert_task(
        &self,
        task: &Task,
        values: &[FieldValue],
        events: &[TaskEvent],
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        if state.key_index.contains_key(task.key()) {
            return Err(TaskRepositoryError::DuplicateTaskKey(task.key().clone()));
        }

        state.key_index.insert(task.key().clone(), task.id());
        state.tasks.insert(task.id(), task.clone());
        let stored_values = values
            .iter()
            .map(|value| (value.field_id(), value.clone()))
            .collect();
        state.values.insert(task.id(), stored_values);
        state.record(events.iter().cloned());
        Ok(())
    }

    async fn max_task_number(
        &self,
        project_id: ProjectId,
    ) -> TaskRepositoryResult<Option<TaskNumber>> {
        let state = self.read()?;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.project_id() == project_id)
            .map(Task::number)
            .max())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn list_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.project_id() == project_id)
            .cloned()
            .collect();
        newest_first(&mut tasks);
        Ok(tasks)
    }

    async fn count_by_schema(&self, schema_id: ProjectSchemaId) -> TaskRepositoryResult<u64> {
        let state = self.read()?;
        let count = state
            .tasks
            .values()
            .filter(|task| task.schema_id() == schema_id)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn field_values(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<FieldValue>> {
        let state = self.read()?;
        Ok(state
            .values
            .get(&task_id)
            .map(|values| values.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn events(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskEvent>> {
        let state = self.read()?;
        Ok(state
            .events
            .get(&task_id)
            .map(|events| events.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn apply_update(&self, update: &TaskUpdate) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let task_id = update.task_id;
        let stored = state.task_mut(task_id)?;
        if stored.revision() != update.expected_revision {
            return Err(TaskRepositoryError::StaleRevision {
                task_id,
                expected: update.expected_revision,
                actual: stored.revision(),
            });
        }
        stored.record_edit(update.summary.clone(), update.updated_at);

        let values = state.values.entry(task_id).or_default();
        for field_id in &update.clears {
            values.remove(field_id);
        }
        for value in &update.upserts {
            values.insert(value.field_id(), value.clone());
        }
        state.record(update.events.iter().cloned());
        Ok(())
    }

    async fn commit_status_change(
        &self,
        task: &Task,
        expected: StatusId,
        event: &TaskEvent,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state.task_mut(task.id())?;
        if stored.status() != expected {
            return Err(TaskRepositoryError::StaleStatus {
                task_id: task.id(),
                expected,
                actual: stored.status(),
            });
        }
        stored.absorb_move(task);
        state.record([event.clone()]);
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.tasks.contains_key(&id) {
            return Err(TaskRepositoryError::NotFound(id));
        }
        if state.links.iter().any(|link| link.touches(id)) {
            return Err(TaskRepositoryError::TaskHasLinks(id));
        }
        if let Some(task) = state.tasks.remove(&id) {
            state.key_index.remove(task.key());
        }
        state.values.remove(&id);
        state.events.remove(&id);
        Ok(())
    }

    async fn insert_link(&self, link: &Link, event: &TaskEvent) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        for task_id in [link.src_task_id(), link.dest_task_id()] {
            if !state.tasks.contains_key(&task_id) {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
        }
        if state.links.iter().any(|existing| existing.duplicates(link)) {
            return Err(TaskRepositoryError::DuplicateLink {
                link_type_id: link.link_type_id(),
                src_task_id: link.src_task_id(),
                dest_task_id: link.dest_task_id(),
            });
        }
        state.links.push(link.clone());
        state.record([event.clone()]);
        Ok(())
    }

    async fn find_link(&self, id: LinkId) -> TaskRepositoryResult<Option<Link>> {
        let state = self.read()?;
        Ok(state.links.iter().find(|link| link.id() == id).cloned())
    }

    async fn delete_link(&self, id: LinkId, event: &TaskEvent) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let before = state.links.len();
        state.links.retain(|link| link.id() != id);
        if state.links.len() == before {
            return Err(TaskRepositoryError::LinkNotFound(id));
        }
        state.record([event.clone()]);
        Ok(())
    }

    async fn links_for(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Link>> {
        let state = self.read()?;
        Ok(state
            .links
            .iter()
            .filter(|link| link.touches(task_id))
            .cloned()
            .collect())
    }
}
