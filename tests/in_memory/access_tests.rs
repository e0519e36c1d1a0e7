//! Group-based access control through the public task service.

use super::helpers::Tracker;
use rstest::rstest;
use std::collections::BTreeSet;
use trellis::{
    identity::{GroupId, User, UserId},
    permission::Action,
    schema::domain::AccessGroups,
    task::services::{TaskServiceError, UpdateTaskRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn readers_cannot_write() -> Result<(), eyre::Report> {
    let (readers, writers) = (GroupId::new(), GroupId::new());
    let mut tracker = Tracker::build(AccessGroups {
        read: BTreeSet::from([readers]),
        write: BTreeSet::from([writers]),
        delete: BTreeSet::new(),
    })
    .await?;
    tracker.user = User::new(UserId::new(), "walt").with_groups([writers]);
    let reader = User::new(UserId::new(), "ruth").with_groups([readers]);
    let id = tracker.create("Shared").await?.task.id();

    let read = tracker.service.get_task(id, &reader).await;
    let moved = tracker
        .service
        .execute_transition(id, tracker.start.id(), &reader)
        .await;
    let edited = tracker
        .service
        .update_task(id, UpdateTaskRequest::new().with_summary("Mine"), &reader)
        .await;

    assert!(read.is_ok());
    for outcome in [moved.err(), edited.err()] {
        assert!(matches!(
            outcome,
            Some(TaskServiceError::PermissionDenied(denial)) if denial.action == Action::Write
        ));
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn writers_can_read_without_read_membership() -> Result<(), eyre::Report> {
    let (readers, writers) = (GroupId::new(), GroupId::new());
    let mut tracker = Tracker::build(AccessGroups {
        read: BTreeSet::from([readers]),
        write: BTreeSet::from([writers]),
        delete: BTreeSet::new(),
    })
    .await?;
    tracker.user = User::new(UserId::new(), "walt").with_groups([writers]);
    let id = tracker.create("Visible to writers").await?.task.id();

    let listed = tracker
        .service
        .list_tasks(tracker.schema.project_id(), &tracker.user)
        .await?;
    let events = tracker.service.task_events(id, &tracker.user).await?;

    assert_eq!(listed.len(), 1);
    assert_eq!(events.len(), 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn strangers_see_nothing() -> Result<(), eyre::Report> {
    let tracker = Tracker::build(AccessGroups {
        read: BTreeSet::from([GroupId::new()]),
        ..AccessGroups::default()
    })
    .await?;
    tracker.create("Secret").await?;
    let stranger = User::new(UserId::new(), "sam");

    let listed = tracker
        .service
        .list_tasks(tracker.schema.project_id(), &stranger)
        .await?;

    assert!(listed.is_empty());
    Ok(())
}
