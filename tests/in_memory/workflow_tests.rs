//! Transition execution through the public task service.

use super::helpers::{Tracker, count, tracker};
use eyre::ensure;
use rstest::rstest;
use serde_json::json;
use trellis::{
    schema::services::DefineTransitionRequest,
    task::{domain::TaskEventType, services::TaskServiceError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_walks_open_to_done(
    #[future] tracker: Result<Tracker, eyre::Report>,
) -> Result<(), eyre::Report> {
    let tracker = tracker.await?;
    let created = tracker.create("Write release notes").await?;
    let id = created.task.id();
    ensure!(created.task.key().as_str() == "CORE-1", "unexpected key");
    ensure!(created.task.status() == tracker.open.id(), "task should start open");

    tracker
        .service
        .execute_transition(id, tracker.start.id(), &tracker.user)
        .await?;
    let eligible = tracker
        .service
        .list_eligible_transitions(id, &tracker.user)
        .await?;
    ensure!(
        eligible.iter().map(|summary| summary.id).collect::<Vec<_>>() == vec![tracker.finish.id()],
        "only Finish should be offered from In Progress"
    );
    tracker
        .service
        .execute_transition(id, tracker.finish.id(), &tracker.user)
        .await?;

    let current = tracker.service.get_task(id, &tracker.user).await?;
    assert_eq!(current.task.status(), tracker.done.id());
    assert_eq!(current.status.status_type.name, "Complete");
    assert_eq!(tracker.counter.runs("finish"), 1);
    let kinds: Vec<TaskEventType> = tracker
        .service
        .task_events(id, &tracker.user)
        .await?
        .iter()
        .map(|event| event.event_type())
        .collect();
    assert_eq!(
        kinds,
        vec![
            TaskEventType::StatusUpdated,
            TaskEventType::StatusUpdated,
            TaskEventType::TaskCreated,
        ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn done_tasks_offer_no_transitions(
    #[future] tracker: Result<Tracker, eyre::Report>,
) -> Result<(), eyre::Report> {
    let tracker = tracker.await?;
    let id = tracker.create("Terminal").await?.task.id();
    for transition in [&tracker.start, &tracker.finish] {
        tracker
            .service
            .execute_transition(id, transition.id(), &tracker.user)
            .await?;
    }

    let eligible = tracker
        .service
        .list_eligible_transitions(id, &tracker.user)
        .await?;
    let again = tracker
        .service
        .execute_transition(id, tracker.finish.id(), &tracker.user)
        .await;

    assert!(eligible.is_empty());
    assert!(matches!(
        again,
        Err(TaskServiceError::TransitionNotAllowed { .. })
    ));
    assert_eq!(tracker.counter.runs("finish"), 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pre_commit_postfunctions_run_before_the_move(
    #[future] tracker: Result<Tracker, eyre::Report>,
) -> Result<(), eyre::Report> {
    let tracker = tracker.await?;
    let skip = tracker
        .schemas
        .define_transition(
            DefineTransitionRequest::new(
                tracker.workflow.id(),
                "Skip ahead",
                Some(tracker.open.id()),
                tracker.done.id(),
            )
            .with_postfunctions(json!([count("prepare", -5), count("announce", 5)])),
        )
        .await?;
    let id = tracker.create("Shortcut").await?.task.id();

    tracker
        .service
        .execute_transition(id, skip.id(), &tracker.user)
        .await?;

    assert_eq!(tracker.counter.runs("prepare"), 1);
    assert_eq!(tracker.counter.runs("announce"), 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn racing_transitions_commit_exactly_once(
    #[future] tracker: Result<Tracker, eyre::Report>,
) -> Result<(), eyre::Report> {
    let tracker = tracker.await?;
    let id = tracker.create("Race").await?.task.id();
    let attempts: Vec<_> = (0..4)
        .map(|_| {
            let service = tracker.service.clone();
            let user = tracker.user.clone();
            let transition_id = tracker.start.id();
            tokio::spawn(async move { service.execute_transition(id, transition_id, &user).await })
        })
        .collect();

    let mut succeeded = 0;
    for attempt in attempts {
        match attempt.await? {
            Ok(()) => succeeded += 1,
            Err(TaskServiceError::TransitionNotAllowed { .. }) => {}
            Err(other) => return Err(other.into()),
        }
    }

    assert_eq!(succeeded, 1);
    let moves = tracker
        .service
        .task_events(id, &tracker.user)
        .await?
        .iter()
        .filter(|event| event.event_type() == TaskEventType::StatusUpdated)
        .count();
    assert_eq!(moves, 1);
    Ok(())
}
