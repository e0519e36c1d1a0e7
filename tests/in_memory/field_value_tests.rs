//! Field validation and update atomicity through the public task service.

use super::helpers::{Tracker, tracker};
use rstest::rstest;
use serde_json::{Value, json};
use trellis::{
    error::ErrorClass,
    task::{
        domain::TaskEventType,
        services::{TaskServiceError, UpdateTaskRequest},
    },
    validation::SchemaViolation,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_values_leave_the_stored_value_unchanged(
    #[future] tracker: Result<Tracker, eyre::Report>,
) -> Result<(), eyre::Report> {
    let tracker = tracker.await?;
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

    let rejected = tracker
        .service
        .update_task(
            id,
            UpdateTaskRequest::new().with_field(tracker.estimate.id(), json!("three")),
            &tracker.user,
        )
        .await;

    let err = rejected.expect_err("a string is not an integer");
    assert!(matches!(
        &err,
        TaskServiceError::SchemaViolation(SchemaViolation::InvalidFieldValue { field_key, .. })
            if field_key == "estimate"
    ));
    assert_eq!(err.class(), ErrorClass::Client);
    let current = tracker.service.get_task(id, &tracker.user).await?;
    assert_eq!(current.value_of("estimate"), Some(&json!(3)));
    let events = tracker.service.task_events(id, &tracker.user).await?;
    assert_eq!(events.len(), 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn value_history_is_recorded_per_change(
    #[future] tracker: Result<Tracker, eyre::Report>,
) -> Result<(), eyre::Report> {
    let tracker = tracker.await?;
    let id = tracker.create("Track estimates").await?.task.id();

    for value in [json!(1), json!(1), json!(2), Value::Null] {
        tracker
            .service
            .update_task(
                id,
                UpdateTaskRequest::new().with_field(tracker.estimate.id(), value),
                &tracker.user,
            )
            .await?;
    }

    let changes: Vec<(Option<Value>, Option<Value>)> = tracker
        .service
        .task_events(id, &tracker.user)
        .await?
        .into_iter()
        .filter(|event| event.event_type() == TaskEventType::TaskUpdated)
        .map(|event| (event.old_value().cloned(), event.new_value().cloned()))
        .collect();
    assert_eq!(
        changes,
        vec![
            (Some(json!(2)), None),
            (Some(json!(1)), Some(json!(2))),
            (None, Some(json!(1))),
        ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn summaries_are_validated_on_update(
    #[future] tracker: Result<Tracker, eyre::Report>,
) -> Result<(), eyre::Report> {
    let tracker = tracker.await?;
    let id = tracker.create("Keep me").await?.task.id();
    let oversized = "x".repeat(1025);

    let result = tracker
        .service
        .update_task(
            id,
            UpdateTaskRequest::new().with_summary(oversized),
            &tracker.user,
        )
        .await;

    assert!(matches!(result, Err(TaskServiceError::Domain(_))));
    let current = tracker.service.get_task(id, &tracker.user).await?;
    assert_eq!(current.task.summary().as_str(), "Keep me");
    Ok(())
}
