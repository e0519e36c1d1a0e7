//! Capability traits implemented by pluggable extensions.

use super::ExtensionError;
use crate::identity::User;
use crate::task::domain::{Task, TaskEvent};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Result type returned by extension code.
pub type ExtensionResult<T> = Result<T, ExtensionError>;

/// Guard deciding whether a transition is available to a user.
#[async_trait]
pub trait Condition: Send + Sync {
    /// Returns `true` when the guarded transition may be offered.
    async fn is_active(&self, task: &Task, user: &User) -> bool;
}

/// Side effect attached to a transition.
#[async_trait]
pub trait Postfunction: Send + Sync {
    /// Runs the side effect for `task`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError`] when the side effect fails.
    async fn execute(&self, task: &Task, user: &User) -> ExtensionResult<()>;
}

/// Receiver of the events produced by a committed task mutation.
#[async_trait]
pub trait EventListener: Send + Sync {
    /// Delivers a batch of events recorded for `task`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError`] when delivery fails.
    async fn notify(&self, task: &Task, events: &[TaskEvent], user: &User)
    -> ExtensionResult<()>;
}

/// The three kinds of capability an extension can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    /// Transition guard.
    Condition,
    /// Transition side effect.
    Postfunction,
    /// Event listener.
    EventListener,
}

impl CapabilityKind {
    /// Returns a human-readable name for logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Condition => "condition",
            Self::Postfunction => "postfunction",
            Self::EventListener => "event listener",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A freshly constructed extension instance.
#[derive(Clone)]
pub enum Capability {
    /// Transition guard.
    Condition(Arc<dyn Condition>),
    /// Transition side effect.
    Postfunction(Arc<dyn Postfunction>),
    /// Event listener.
    EventListener(Arc<dyn EventListener>),
}

impl Capability {
    /// Returns which capability this instance provides.
    #[must_use]
    pub const fn kind(&self) -> CapabilityKind {
        match self {
            Self::Condition(_) => CapabilityKind::Condition,
            Self::Postfunction(_) => CapabilityKind::Postfunction,
            Self::EventListener(_) => CapabilityKind::EventListener,
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Capability").field(&self.kind()).finish()
    }
}
