//! Delivery of committed task events to a schema's listeners.

use crate::extension::ports::ExtensionResolver;
use crate::identity::User;
use crate::schema::domain::{ProjectSchema, by_priority};
use crate::task::domain::{Task, TaskEvent};
use std::sync::Arc;
use tracing::{debug, warn};

/// Fans committed events out to the listeners configured on a schema.
///
/// Listeners are resolved on every dispatch and run in ascending priority.
/// A listener that cannot be resolved or fails is logged and skipped; later
/// listeners still run and the originating operation is unaffected.
pub struct EventDispatcher<X>
where
    X: ExtensionResolver,
{
    resolver: Arc<X>,
}

impl<X> Clone for EventDispatcher<X>
where
    X: ExtensionResolver,
{
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<X> EventDispatcher<X>
where
    X: ExtensionResolver,
{
    /// Creates a dispatcher resolving listeners through `resolver`.
    #[must_use]
    pub const fn new(resolver: Arc<X>) -> Self {
        Self { resolver }
    }

    /// Delivers `events` for `task` to every listener of `schema`.
    pub async fn dispatch(
        &self,
        schema: &ProjectSchema,
        task: &Task,
        events: &[TaskEvent],
        user: &User,
    ) {
        if events.is_empty() {
            return;
        }
        for spec in by_priority(schema.event_listeners()) {
            let listener = match self.resolver.resolve_listener(spec) {
                Ok(listener) => listener,
                Err(err) => {
                    warn!(
                        task_id = %task.id(),
                        class_ref = spec.class_ref(),
                        error = %err,
                        "skipping unresolvable event listener"
                    );
                    continue;
                }
            };
            match listener.notify(task, events, user).await {
                Ok(()) => debug!(
                    task_id = %task.id(),
                    class_ref = spec.class_ref(),
                    count = events.len(),
                    "delivered task events"
                ),
                Err(err) => warn!(
                    task_id = %task.id(),
                    class_ref = spec.class_ref(),
                    error = %err,
                    "event listener failed"
                ),
            }
        }
    }
}
