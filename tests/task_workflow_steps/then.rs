//! Then steps for task workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, run_async};
use rstest_bdd_macros::then;
use serde_json::json;
use trellis::task::services::TaskServiceError;
use trellis::validation::SchemaViolation;

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskWorkflowWorld, status: String) -> Result<(), eyre::Report> {
    let tracker = world.tracker()?;
    let snapshot = run_async(tracker.service.get_task(world.task_id()?, &tracker.user))?;
    if snapshot.status.name != status {
        return Err(eyre::eyre!(
            "expected status {status}, found {}",
            snapshot.status.name
        ));
    }
    Ok(())
}

#[then(r#"the "{label}" postfunction ran {times:usize} time"#)]
fn postfunction_ran(
    world: &TaskWorkflowWorld,
    label: String,
    times: usize,
) -> Result<(), eyre::Report> {
    let runs = world.tracker()?.counter.runs(&label);
    eyre::ensure!(runs == times, "expected {times} runs of {label}, found {runs}");
    Ok(())
}

#[then("the transition is rejected as not allowed")]
fn transition_rejected(world: &TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_transition_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing transition result"))?;
    if !matches!(result, Err(TaskServiceError::TransitionNotAllowed { .. })) {
        return Err(eyre::eyre!(
            "expected TransitionNotAllowed error, got {result:?}"
        ));
    }
    Ok(())
}

#[then(r#"the eligible transitions are "{names}""#)]
fn eligible_transitions_are(world: &TaskWorkflowWorld, names: String) -> Result<(), eyre::Report> {
    let tracker = world.tracker()?;
    let eligible = run_async(
        tracker
            .service
            .list_eligible_transitions(world.task_id()?, &tracker.user),
    )?;
    let found: Vec<String> = eligible.into_iter().map(|summary| summary.name).collect();
    let expected: Vec<String> = names.split(", ").map(str::to_owned).collect();
    eyre::ensure!(found == expected, "expected {expected:?}, found {found:?}");
    Ok(())
}

#[then("the update is rejected with a schema violation")]
fn update_rejected(world: &TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_update_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing update result"))?;
    if !matches!(
        result,
        Err(TaskServiceError::SchemaViolation(
            SchemaViolation::InvalidFieldValue { .. }
        ))
    ) {
        return Err(eyre::eyre!(
            "expected InvalidFieldValue error, got {result:?}"
        ));
    }
    Ok(())
}

#[then("the estimate is {estimate:i64}")]
fn estimate_is(world: &TaskWorkflowWorld, estimate: i64) -> Result<(), eyre::Report> {
    let tracker = world.tracker()?;
    let snapshot = run_async(tracker.service.get_task(world.task_id()?, &tracker.user))?;
    let expected = json!(estimate);
    eyre::ensure!(
        snapshot.value_of("estimate") == Some(&expected),
        "expected estimate {estimate}, found {:?}",
        snapshot.value_of("estimate")
    );
    Ok(())
}
