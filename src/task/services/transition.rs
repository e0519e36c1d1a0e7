//! Workflow transition evaluation and execution.

use super::{EventDispatcher, TaskServiceError, TaskServiceResult};
use crate::error::MissingEntity;
use crate::extension::ports::ExtensionResolver;
use crate::identity::User;
use crate::schema::{
    domain::{ExtensionPhase, Transition, TransitionId, by_priority, in_phase},
    ports::SchemaRegistry,
    services::SchemaLookup,
};
use crate::task::{
    domain::{Task, TaskEvent, TaskId},
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decides which transitions a user may take and applies them.
///
/// A transition is eligible when it leaves the task's current status (or
/// any status), is not the initial transition, and every condition passes.
/// Conditions run in ascending priority and stop at the first failure.
///
/// Executing a transition commits the new status together with its
/// `STATUS_UPDATED` event as a compare-and-swap on the status eligibility
/// was computed against, so of two racing executions at most one applies.
pub struct TransitionEngine<S, R, X, C>
where
    S: SchemaRegistry,
    R: TaskRepository,
    X: ExtensionResolver,
    C: Clock + Send + Sync,
{
    lookup: SchemaLookup<S>,
    tasks: Arc<R>,
    resolver: Arc<X>,
    dispatcher: EventDispatcher<X>,
    clock: Arc<C>,
}

impl<S, R, X, C> Clone for TransitionEngine<S, R, X, C>
where
    S: SchemaRegistry,
    R: TaskRepository,
    X: ExtensionResolver,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            lookup: self.lookup.clone(),
            tasks: Arc::clone(&self.tasks),
            resolver: Arc::clone(&self.resolver),
            dispatcher: self.dispatcher.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, R, X, C> TransitionEngine<S, R, X, C>
where
    S: SchemaRegistry,
    R: TaskRepository,
    X: ExtensionResolver,
    C: Clock + Send + Sync,
{
    /// Creates an engine over the given registry, store and resolver.
    #[must_use]
    pub fn new(lookup: SchemaLookup<S>, tasks: Arc<R>, resolver: Arc<X>, clock: Arc<C>) -> Self {
        let dispatcher = EventDispatcher::new(Arc::clone(&resolver));
        Self {
            lookup,
            tasks,
            resolver,
            dispatcher,
            clock,
        }
    }

    /// Returns the transitions `user` may take from the task's current
    /// status, in workflow definition order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::UnresolvedExtension`] when a condition
    /// cannot be resolved, or a lookup error when the task's schema or
    /// workflow is missing.
    pub async fn list_eligible(
        &self,
        task: &Task,
        user: &User,
    ) -> TaskServiceResult<Vec<Transition>> {
        let schema = self.lookup.project_schema(task.schema_id()).await?;
        let graph = self.lookup.workflow(schema.workflow_id()).await?;
        let mut eligible = Vec::new();
        for transition in graph.outgoing(task.status()) {
            if self.conditions_pass(transition, task, user).await? {
                eligible.push(transition.clone());
            }
        }
        Ok(eligible)
    }

    /// Applies `transition_id` to the task on behalf of `user`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TransitionNotAllowed`] when the transition
    /// is not eligible for the task's current status, including when a
    /// concurrent transition moved the task first.
    pub async fn execute(
        &self,
        task_id: TaskId,
        transition_id: TransitionId,
        user: &User,
    ) -> TaskServiceResult<Task> {
        let task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskServiceError::NotFound(MissingEntity::Task(task_id)))?;
        let schema = self.lookup.project_schema(task.schema_id()).await?;
        let graph = self.lookup.workflow(schema.workflow_id()).await?;
        let not_allowed = || TaskServiceError::TransitionNotAllowed {
            task_id,
            transition_id,
        };

        let transition = graph
            .transitions()
            .iter()
            .find(|candidate| candidate.id() == transition_id)
            .filter(|candidate| candidate.leaves(task.status()))
            .ok_or_else(not_allowed)?;
        if !self.conditions_pass(transition, &task, user).await? {
            return Err(not_allowed());
        }

        self.run_postfunctions(ExtensionPhase::PreCommit, transition, &task, user)
            .await;

        let from = self.lookup.status(task.status()).await?;
        let to = self.lookup.status(transition.dest_status()).await?;
        let event = TaskEvent::status_updated(
            task_id,
            &from.snapshot(),
            &to.snapshot(),
            user.id(),
            &*self.clock,
        );
        let mut moved = task.clone();
        moved.move_to(to.id(), &*self.clock);

        self.tasks
            .commit_status_change(&moved, task.status(), &event)
            .await
            .map_err(|err| match err {
                TaskRepositoryError::StaleStatus { .. } => not_allowed(),
                other => other.into(),
            })?;
        info!(
            task_id = %task_id,
            transition = transition.name(),
            from = from.name(),
            to = to.name(),
            "task transitioned"
        );

        self.run_postfunctions(ExtensionPhase::PostCommit, transition, &moved, user)
            .await;
        self.dispatcher
            .dispatch(&schema, &moved, std::slice::from_ref(&event), user)
            .await;
        Ok(moved)
    }

    async fn conditions_pass(
        &self,
        transition: &Transition,
        task: &Task,
        user: &User,
    ) -> TaskServiceResult<bool> {
        for spec in by_priority(transition.conditions()) {
            let condition = self.resolver.resolve_condition(spec)?;
            if !condition.is_active(task, user).await {
                debug!(
                    task_id = %task.id(),
                    transition = transition.name(),
                    class_ref = spec.class_ref(),
                    "condition rejected transition"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn run_postfunctions(
        &self,
        phase: ExtensionPhase,
        transition: &Transition,
        task: &Task,
        user: &User,
    ) {
        for spec in in_phase(transition.postfunctions(), phase) {
            match self.resolver.resolve_postfunction(spec) {
                Ok(postfunction) => {
                    if let Err(err) = postfunction.execute(task, user).await {
                        warn!(
                            task_id = %task.id(),
                            transition = transition.name(),
                            class_ref = spec.class_ref(),
                            ?phase,
                            error = %err,
                            "postfunction failed"
                        );
                    }
                }
                Err(err) => warn!(
                    task_id = %task.id(),
                    transition = transition.name(),
                    class_ref = spec.class_ref(),
                    ?phase,
                    error = %err,
                    "skipping unresolvable postfunction"
                ),
            }
        }
    }
}
