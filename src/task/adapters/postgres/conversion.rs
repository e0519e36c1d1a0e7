//! Conversions between task domain types and Diesel rows.

use super::models::{FieldValueRow, LinkRow, NewTaskEventRow, NewTaskRow, TaskEventRow, TaskRow};
use crate::identity::UserId;
use crate::schema::domain::{
    FieldId, LinkTypeId, ProjectId, ProjectSchemaId, StatusId, TaskTypeId,
};
use crate::task::{
    domain::{
        FieldValue, Link, LinkId, PersistedTaskData, PersistedTaskEventData, Summary, Task,
        TaskEvent, TaskEventId, TaskEventType, TaskId, TaskKey, TaskNumber,
    },
    ports::{TaskRepositoryError, TaskRepositoryResult},
};

pub(super) fn to_new_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    let number =
        i64::try_from(task.number().value()).map_err(TaskRepositoryError::persistence)?;
    let revision = i64::try_from(task.revision()).map_err(TaskRepositoryError::persistence)?;
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        schema_id: task.schema_id().into_inner(),
        project_id: task.project_id().into_inner(),
        task_type_id: task.task_type_id().into_inner(),
        number,
        task_key: task.key().as_str().to_owned(),
        summary: task.summary().as_str().to_owned(),
        status_id: task.status().into_inner(),
        creator_id: task.creator().into_inner(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        revision,
    })
}

pub(super) fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let raw_number =
        u64::try_from(row.number).map_err(TaskRepositoryError::invalid_persisted_data)?;
    let number =
        TaskNumber::new(raw_number).map_err(TaskRepositoryError::invalid_persisted_data)?;
    let revision =
        u64::try_from(row.revision).map_err(TaskRepositoryError::invalid_persisted_data)?;
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        schema_id: ProjectSchemaId::from_uuid(row.schema_id),
        project_id: ProjectId::from_uuid(row.project_id),
        task_type_id: TaskTypeId::from_uuid(row.task_type_id),
        number,
        key: TaskKey::from_persisted(row.task_key),
        summary: Summary::from_persisted(row.summary),
        status: StatusId::from_uuid(row.status_id),
        creator: UserId::from_uuid(row.creator_id),
        created_at: row.created_at,
        updated_at: row.updated_at,
        revision,
    }))
}

pub(super) fn to_value_row(value: &FieldValue) -> FieldValueRow {
    FieldValueRow {
        task_id: value.task_id().into_inner(),
        field_id: value.field_id().into_inner(),
        value: value.value().clone(),
    }
}

pub(super) fn row_to_value(row: FieldValueRow) -> FieldValue {
    FieldValue::new(
        TaskId::from_uuid(row.task_id),
        FieldId::from_uuid(row.field_id),
        row.value,
    )
}

pub(super) fn to_event_row(event: &TaskEvent) -> TaskRepositoryResult<NewTaskEventRow> {
    let field = event
        .field()
        .map(serde_json::to_value)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    Ok(NewTaskEventRow {
        id: event.id().into_inner(),
        task_id: event.task_id().into_inner(),
        event_type: event.event_type().as_str().to_owned(),
        field,
        old_value: event.old_value().cloned(),
        new_value: event.new_value().cloned(),
        user_id: event.user_id().into_inner(),
        created_at: event.created_at(),
    })
}

pub(super) fn to_event_rows(events: &[TaskEvent]) -> TaskRepositoryResult<Vec<NewTaskEventRow>> {
    events.iter().map(to_event_row).collect()
}

pub(super) fn row_to_event(row: TaskEventRow) -> TaskRepositoryResult<TaskEvent> {
    let event_type = TaskEventType::try_from(row.event_type.as_str())
        .map_err(TaskRepositoryError::invalid_persisted_data)?;
    let field = row
        .field
        .map(serde_json::from_value)
        .transpose()
        .map_err(TaskRepositoryError::invalid_persisted_data)?;
    Ok(TaskEvent::from_persisted(PersistedTaskEventData {
        id: TaskEventId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        event_type,
        field,
        old_value: row.old_value,
        new_value: row.new_value,
        user_id: UserId::from_uuid(row.user_id),
        created_at: row.created_at,
    }))
}

pub(super) fn to_link_row(link: &Link) -> LinkRow {
    LinkRow {
        id: link.id().into_inner(),
        link_type_id: link.link_type_id().into_inner(),
        src_task_id: link.src_task_id().into_inner(),
        dest_task_id: link.dest_task_id().into_inner(),
        created_at: link.created_at(),
    }
}

pub(super) fn row_to_link(row: LinkRow) -> Link {
    Link::from_persisted(
        LinkId::from_uuid(row.id),
        LinkTypeId::from_uuid(row.link_type_id),
        (
            TaskId::from_uuid(row.src_task_id),
            TaskId::from_uuid(row.dest_task_id),
        ),
        row.created_at,
    )
}

#[cfg(test)]
mod tests {
    //! Row conversion tests that need no database.

    use super::*;
    use crate::schema::domain::{FieldSnapshot, ProjectKey};
    use chrono::{TimeZone, Utc};
    use mockable::DefaultClock;
    use rstest::rstest;
    use serde_json::json;

    fn sample_task() -> Task {
        let project_key = ProjectKey::new("OPS").expect("valid project key");
        let number = TaskNumber::new(7).expect("valid number");
        let placement = crate::task::domain::TaskPlacement {
            schema_id: ProjectSchemaId::new(),
            project_id: ProjectId::new(),
            task_type_id: TaskTypeId::new(),
            number,
            key: TaskKey::compose(&project_key, number, 64).expect("key fits"),
            status: StatusId::new(),
        };
        let summary = Summary::new("Rotate credentials", 1024).expect("valid summary");
        Task::new(placement, summary, UserId::new(), &DefaultClock)
    }

    fn sample_event_row(event_type: &str, field: Option<serde_json::Value>) -> TaskEventRow {
        TaskEventRow {
            id: uuid::Uuid::new_v4(),
            task_id: uuid::Uuid::new_v4(),
            event_type: event_type.to_owned(),
            field,
            old_value: Some(json!(1)),
            new_value: Some(json!(2)),
            user_id: uuid::Uuid::new_v4(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("timestamp"),
        }
    }

    #[rstest]
    fn task_survives_row_conversion() {
        let task = sample_task();
        let row = to_new_row(&task).expect("row");
        assert_eq!(row.task_key, "OPS-7");

        let restored = row_to_task(TaskRow {
            id: row.id,
            schema_id: row.schema_id,
            project_id: row.project_id,
            task_type_id: row.task_type_id,
            number: row.number,
            task_key: row.task_key,
            summary: row.summary,
            status_id: row.status_id,
            creator_id: row.creator_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            revision: row.revision,
        })
        .expect("task");
        assert_eq!(restored, task);
    }

    #[rstest]
    #[case::zero(0)]
    #[case::negative(-3)]
    fn non_positive_task_numbers_are_rejected(#[case] number: i64) {
        let task = sample_task();
        let row = to_new_row(&task).expect("row");
        let result = row_to_task(TaskRow {
            id: row.id,
            schema_id: row.schema_id,
            project_id: row.project_id,
            task_type_id: row.task_type_id,
            number,
            task_key: row.task_key,
            summary: row.summary,
            status_id: row.status_id,
            creator_id: row.creator_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            revision: row.revision,
        });
        assert!(matches!(
            result,
            Err(TaskRepositoryError::InvalidPersistedData(_))
        ));
    }

    #[rstest]
    fn event_rows_restore_field_snapshots() {
        let snapshot = FieldSnapshot {
            id: FieldId::new(),
            key: "points".to_owned(),
            name: "Story points".to_owned(),
        };
        let row = sample_event_row(
            "TASK_UPDATED",
            Some(serde_json::to_value(&snapshot).expect("snapshot json")),
        );
        let event = row_to_event(row).expect("event");
        assert_eq!(event.event_type(), TaskEventType::TaskUpdated);
        assert_eq!(event.field(), Some(&snapshot));
        assert_eq!(event.new_value(), Some(&json!(2)));
    }

    #[rstest]
    fn unknown_event_types_are_invalid_data() {
        let result = row_to_event(sample_event_row("TASK_ARCHIVED", None));
        assert!(matches!(
            result,
            Err(TaskRepositoryError::InvalidPersistedData(_))
        ));
    }

    #[rstest]
    fn malformed_field_snapshots_are_invalid_data() {
        let result = row_to_event(sample_event_row("TASK_UPDATED", Some(json!("points"))));
        assert!(matches!(
            result,
            Err(TaskRepositoryError::InvalidPersistedData(_))
        ));
    }
}
