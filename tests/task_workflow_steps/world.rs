//! Shared world state for task workflow BDD scenarios.

use super::helpers::Tracker;
use rstest::fixture;
use trellis::task::{
    domain::TaskId,
    services::{TaskServiceError, TaskSnapshot},
};

/// Scenario world for task workflow behaviour tests.
#[derive(Default)]
pub struct TaskWorkflowWorld {
    pub tracker: Option<Tracker>,
    pub task_id: Option<TaskId>,
    pub last_transition_result: Option<Result<(), TaskServiceError>>,
    pub last_update_result: Option<Result<TaskSnapshot, TaskServiceError>>,
}

impl TaskWorkflowWorld {
    /// Returns the tracker built by the background step.
    ///
    /// # Errors
    ///
    /// Returns an error when no tracker has been built yet.
    pub fn tracker(&self) -> Result<&Tracker, eyre::Report> {
        self.tracker
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing tracker in scenario world"))
    }

    /// Returns the task created by a given step.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been created yet.
    pub fn task_id(&self) -> Result<TaskId, eyre::Report> {
        self.task_id
            .ok_or_else(|| eyre::eyre!("missing created task in scenario world"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskWorkflowWorld {
    TaskWorkflowWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
