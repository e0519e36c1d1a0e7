//! Extensions shipped with the engine.

use super::ExtensionRegistry;
use crate::extension::domain::{
    Condition, EventListener, ExtensionArgs, ExtensionError, ExtensionResult,
};
use crate::identity::{GroupId, User};
use crate::task::domain::{Task, TaskEvent};
use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::info;

/// Class reference of [`UserInGroups`].
pub const USER_IN_GROUPS: &str = "trellis.conditions.UserInGroups";

/// Class reference of [`TracingListener`].
pub const TRACING_LISTENER: &str = "trellis.listeners.Tracing";

pub(super) fn register(registry: &mut ExtensionRegistry) {
    registry.register_condition(USER_IN_GROUPS, UserInGroups::from_args);
    registry.register_listener(TRACING_LISTENER, |_| Ok(TracingListener));
}

/// Passes when the acting user belongs to any of the configured groups.
///
/// Configured through the `groups` keyword argument, a list of group IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInGroups {
    groups: BTreeSet<GroupId>,
}

impl UserInGroups {
    /// Creates the condition for an explicit group set.
    #[must_use]
    pub const fn new(groups: BTreeSet<GroupId>) -> Self {
        Self { groups }
    }

    fn from_args(args: ExtensionArgs<'_>) -> Result<Self, ExtensionError> {
        Ok(Self::new(args.required("groups")?))
    }
}

#[async_trait]
impl Condition for UserInGroups {
    async fn is_active(&self, _task: &Task, user: &User) -> bool {
        user.is_member_of_any(&self.groups)
    }
}

/// Logs every delivered event at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

#[async_trait]
impl EventListener for TracingListener {
    async fn notify(&self, task: &Task, events: &[TaskEvent], user: &User) -> ExtensionResult<()> {
        for event in events {
            info!(
                task_key = %task.key(),
                event_id = %event.id(),
                event_type = event.event_type().as_str(),
                user = %user.id(),
                "task event"
            );
        }
        Ok(())
    }
}
