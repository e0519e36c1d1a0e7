//! Given steps for task workflow BDD scenarios.

use super::helpers::Tracker;
use super::world::{TaskWorkflowWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use serde_json::json;
use trellis::schema::domain::AccessGroups;

#[given("a tracker with an Open, In Progress and Done workflow")]
fn tracker_with_workflow(world: &mut TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let tracker = run_async(Tracker::build(AccessGroups::default()))
        .wrap_err("build tracker for workflow scenario")?;
    world.tracker = Some(tracker);
    Ok(())
}

#[given(r#"a task "{summary}" has been created"#)]
fn task_created(world: &mut TaskWorkflowWorld, summary: String) -> Result<(), eyre::Report> {
    let created = run_async(world.tracker()?.create(&summary)).wrap_err("create scenario task")?;
    world.task_id = Some(created.task.id());
    Ok(())
}

#[given(r#"a task "{summary}" with estimate {estimate:i64} has been created"#)]
fn task_created_with_estimate(
    world: &mut TaskWorkflowWorld,
    summary: String,
    estimate: i64,
) -> Result<(), eyre::Report> {
    let tracker = world.tracker()?;
    let request = tracker
        .request(&summary)
        .with_field(tracker.estimate.id(), json!(estimate));
    let created = run_async(tracker.service.create_task(request, &tracker.user))
        .wrap_err("create scenario task with estimate")?;
    world.task_id = Some(created.task.id());
    Ok(())
}
