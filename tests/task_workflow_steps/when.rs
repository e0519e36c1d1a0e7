//! When steps for task workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, run_async};
use rstest_bdd_macros::when;
use serde_json::json;
use trellis::task::services::UpdateTaskRequest;

#[when(r#"the user executes "{transition}""#)]
fn execute_transition(
    world: &mut TaskWorkflowWorld,
    transition: String,
) -> Result<(), eyre::Report> {
    let tracker = world.tracker()?;
    let task_id = world.task_id()?;
    let transition_id = run_async(tracker.service.task_workflow(task_id, &tracker.user))?
        .into_iter()
        .find(|summary| summary.name == transition)
        .map(|summary| summary.id)
        .ok_or_else(|| eyre::eyre!("workflow has no transition named {transition}"))?;

    let result = run_async(
        tracker
            .service
            .execute_transition(task_id, transition_id, &tracker.user),
    );
    world.last_transition_result = Some(result);
    Ok(())
}

#[when(r#"the user sets the estimate to "{raw}""#)]
fn set_estimate(world: &mut TaskWorkflowWorld, raw: String) -> Result<(), eyre::Report> {
    let tracker = world.tracker()?;
    let task_id = world.task_id()?;
    let request = UpdateTaskRequest::new().with_field(tracker.estimate.id(), json!(raw));
    let result = run_async(tracker.service.update_task(task_id, request, &tracker.user));
    world.last_update_result = Some(result);
    Ok(())
}
