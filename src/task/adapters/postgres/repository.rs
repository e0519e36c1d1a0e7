//! `PostgreSQL` repository implementation for task storage.

use super::{
    conversion::{
        row_to_event, row_to_link, row_to_task, row_to_value, to_event_row, to_event_rows,
        to_link_row, to_new_row, to_value_row,
    },
    models::{FieldValueRow, LinkRow, NewTaskEventRow, TaskEventRow, TaskRow},
    schema::{field_values, links, task_events, tasks},
};
use crate::schema::domain::{ProjectId, ProjectSchemaId, StatusId};
use crate::task::{
    domain::{FieldValue, Link, LinkId, Task, TaskEvent, TaskId, TaskNumber},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskUpdate},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::upsert::excluded;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

const TASK_KEY_CONSTRAINT: &str = "tasks_task_key_key";
const TASK_NUMBER_CONSTRAINT: &str = "tasks_project_id_number_key";
const LINK_UNIQUE_CONSTRAINT: &str = "links_link_type_id_src_task_id_dest_task_id_key";

/// `PostgreSQL`-backed task repository.
///
/// Each mutating operation runs in one transaction. Status changes and edits
/// lock the task row with `SELECT ... FOR UPDATE` before comparing the stored
/// status or revision, so concurrent writers on the same task serialize.
/// Field values and events are protected by their foreign keys and are
/// removed explicitly when a task is deleted.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

fn violates(err: &DieselError, constraint: &str) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(constraint)
    )
}

fn task_exists(connection: &mut PgConnection, id: uuid::Uuid) -> TaskRepositoryResult<bool> {
    let count: i64 = tasks::table
        .filter(tasks::id.eq(id))
        .count()
        .get_result(connection)?;
    Ok(count > 0)
}

fn insert_events(
    connection: &mut PgConnection,
    rows: &[NewTaskEventRow],
) -> TaskRepositoryResult<()> {
    if !rows.is_empty() {
        diesel::insert_into(task_events::table)
            .values(rows)
            .execute(connection)?;
    }
    Ok(())
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert_task(
        &self,
        task: &Task,
        values: &[FieldValue],
        events: &[TaskEvent],
    ) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let task_key = task.key().clone();
        let new_row = to_new_row(task)?;
        let value_rows: Vec<FieldValueRow> = values.iter().map(to_value_row).collect();
        let event_rows = to_event_rows(events)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                diesel::insert_into(tasks::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| {
                        if violates(&err, TASK_KEY_CONSTRAINT)
                            || violates(&err, TASK_NUMBER_CONSTRAINT)
                        {
                            TaskRepositoryError::DuplicateTaskKey(task_key.clone())
                        } else if matches!(
                            err,
                            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
                        ) {
                            TaskRepositoryError::DuplicateTask(task_id)
                        } else {
                            TaskRepositoryError::persistence(err)
                        }
                    })?;

                if !value_rows.is_empty() {
                    diesel::insert_into(field_values::table)
                        .values(&value_rows)
                        .execute(tx)?;
                }
                insert_events(tx, &event_rows)
            })
        })
        .await
    }

    async fn max_task_number(
        &self,
        project_id: ProjectId,
    ) -> TaskRepositoryResult<Option<TaskNumber>> {
        let project = project_id.into_inner();
        self.run_blocking(move |connection| {
            let max: Option<i64> = tasks::table
                .filter(tasks::project_id.eq(project))
                .select(diesel::dsl::max(tasks::number))
                .first(connection)?;
            max.map(|raw| {
                let value =
                    u64::try_from(raw).map_err(TaskRepositoryError::invalid_persisted_data)?;
                TaskNumber::new(value).map_err(TaskRepositoryError::invalid_persisted_data)
            })
            .transpose()
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        let project = project_id.into_inner();
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::project_id.eq(project))
                .order((tasks::created_at.desc(), tasks::number.desc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn count_by_schema(&self, schema_id: ProjectSchemaId) -> TaskRepositoryResult<u64> {
        let schema = schema_id.into_inner();
        self.run_blocking(move |connection| {
            let count: i64 = tasks::table
                .filter(tasks::schema_id.eq(schema))
                .count()
                .get_result(connection)?;
            u64::try_from(count).map_err(TaskRepositoryError::invalid_persisted_data)
        })
        .await
    }

    async fn field_values(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<FieldValue>> {
        self.run_blocking(move |connection| {
            let rows = field_values::table
                .filter(field_values::task_id.eq(task_id.into_inner()))
                .select(FieldValueRow::as_select())
                .load::<FieldValueRow>(connection)?;
            Ok(rows.into_iter().map(row_to_value).collect())
        })
        .await
    }

    async fn events(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskEvent>> {
        self.run_blocking(move |connection| {
            let rows = task_events::table
                .filter(task_events::task_id.eq(task_id.into_inner()))
                .order(task_events::seq.desc())
                .select(TaskEventRow::as_select())
                .load::<TaskEventRow>(connection)?;
            rows.into_iter().map(row_to_event).collect()
        })
        .await
    }

    async fn apply_update(&self, update: &TaskUpdate) -> TaskRepositoryResult<()> {
        let task_id = update.task_id;
        let expected = update.expected_revision;
        let expected_raw = i64::try_from(expected).map_err(TaskRepositoryError::persistence)?;
        let summary = update
            .summary
            .as_ref()
            .map(|renamed| renamed.as_str().to_owned());
        let updated_at = update.updated_at;
        let clears: Vec<uuid::Uuid> = update.clears.iter().map(|id| id.into_inner()).collect();
        let upserts: Vec<FieldValueRow> = update.upserts.iter().map(to_value_row).collect();
        let event_rows = to_event_rows(&update.events)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let stored = tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .select(tasks::revision)
                    .for_update()
                    .first::<i64>(tx)
                    .optional()?
                    .ok_or(TaskRepositoryError::NotFound(task_id))?;
                if stored != expected_raw {
                    return Err(TaskRepositoryError::StaleRevision {
                        task_id,
                        expected,
                        actual: u64::try_from(stored)
                            .map_err(TaskRepositoryError::invalid_persisted_data)?,
                    });
                }

                let row = tasks::table.filter(tasks::id.eq(task_id.into_inner()));
                let revision = tasks::revision.eq(expected_raw.saturating_add(1));
                match &summary {
                    Some(renamed) => diesel::update(row)
                        .set((
                            tasks::summary.eq(renamed),
                            tasks::updated_at.eq(updated_at),
                            revision,
                        ))
                        .execute(tx)?,
                    None => diesel::update(row)
                        .set((tasks::updated_at.eq(updated_at), revision))
                        .execute(tx)?,
                };

                if !clears.is_empty() {
                    diesel::delete(
                        field_values::table
                            .filter(field_values::task_id.eq(task_id.into_inner()))
                            .filter(field_values::field_id.eq_any(&clears)),
                    )
                    .execute(tx)?;
                }
                if !upserts.is_empty() {
                    diesel::insert_into(field_values::table)
                        .values(&upserts)
                        .on_conflict((field_values::task_id, field_values::field_id))
                        .do_update()
                        .set(field_values::value.eq(excluded(field_values::value)))
                        .execute(tx)?;
                }
                insert_events(tx, &event_rows)
            })
        })
        .await
    }

    async fn commit_status_change(
        &self,
        task: &Task,
        expected: StatusId,
        event: &TaskEvent,
    ) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let status = task.status();
        let updated_at = task.updated_at();
        let event_row = to_event_row(event)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let stored = tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .select(tasks::status_id)
                    .for_update()
                    .first::<uuid::Uuid>(tx)
                    .optional()?
                    .ok_or(TaskRepositoryError::NotFound(task_id))?;
                if stored != expected.into_inner() {
                    return Err(TaskRepositoryError::StaleStatus {
                        task_id,
                        expected,
                        actual: StatusId::from_uuid(stored),
                    });
                }

                diesel::update(tasks::table.filter(tasks::id.eq(task_id.into_inner())))
                    .set((
                        tasks::status_id.eq(status.into_inner()),
                        tasks::updated_at.eq(updated_at),
                    ))
                    .execute(tx)?;
                insert_events(tx, std::slice::from_ref(&event_row))
            })
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let uuid = id.into_inner();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                if !task_exists(tx, uuid)? {
                    return Err(TaskRepositoryError::NotFound(id));
                }
                let link_count: i64 = links::table
                    .filter(links::src_task_id.eq(uuid).or(links::dest_task_id.eq(uuid)))
                    .count()
                    .get_result(tx)?;
                if link_count > 0 {
                    return Err(TaskRepositoryError::TaskHasLinks(id));
                }

                diesel::delete(task_events::table.filter(task_events::task_id.eq(uuid)))
                    .execute(tx)?;
                diesel::delete(field_values::table.filter(field_values::task_id.eq(uuid)))
                    .execute(tx)?;
                diesel::delete(tasks::table.filter(tasks::id.eq(uuid)))
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                            TaskRepositoryError::TaskHasLinks(id)
                        }
                        other => TaskRepositoryError::persistence(other),
                    })?;
                Ok(())
            })
        })
        .await
    }

    async fn insert_link(&self, link: &Link, event: &TaskEvent) -> TaskRepositoryResult<()> {
        let row = to_link_row(link);
        let link_type_id = link.link_type_id();
        let (src_task_id, dest_task_id) = (link.src_task_id(), link.dest_task_id());
        let event_row = to_event_row(event)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                for task_id in [src_task_id, dest_task_id] {
                    if !task_exists(tx, task_id.into_inner())? {
                        return Err(TaskRepositoryError::NotFound(task_id));
                    }
                }

                diesel::insert_into(links::table)
                    .values(&row)
                    .execute(tx)
                    .map_err(|err| {
                        if violates(&err, LINK_UNIQUE_CONSTRAINT) {
                            TaskRepositoryError::DuplicateLink {
                                link_type_id,
                                src_task_id,
                                dest_task_id,
                            }
                        } else {
                            TaskRepositoryError::persistence(err)
                        }
                    })?;
                insert_events(tx, std::slice::from_ref(&event_row))
            })
        })
        .await
    }

    async fn find_link(&self, id: LinkId) -> TaskRepositoryResult<Option<Link>> {
        self.run_blocking(move |connection| {
            let row = links::table
                .filter(links::id.eq(id.into_inner()))
                .select(LinkRow::as_select())
                .first::<LinkRow>(connection)
                .optional()?;
            Ok(row.map(row_to_link))
        })
        .await
    }

    async fn delete_link(&self, id: LinkId, event: &TaskEvent) -> TaskRepositoryResult<()> {
        let event_row = to_event_row(event)?;
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let deleted = diesel::delete(links::table.filter(links::id.eq(id.into_inner())))
                    .execute(tx)?;
                if deleted == 0 {
                    return Err(TaskRepositoryError::LinkNotFound(id));
                }
                insert_events(tx, std::slice::from_ref(&event_row))
            })
        })
        .await
    }

    async fn links_for(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Link>> {
        let uuid = task_id.into_inner();
        self.run_blocking(move |connection| {
            let rows = links::table
                .filter(links::src_task_id.eq(uuid).or(links::dest_task_id.eq(uuid)))
                .order(links::created_at.asc())
                .select(LinkRow::as_select())
                .load::<LinkRow>(connection)?;
            Ok(rows.into_iter().map(row_to_link).collect())
        })
        .await
    }
}
