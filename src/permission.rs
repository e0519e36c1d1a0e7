//! Group-based access checks for project schemas.
//!
//! Each schema carries read, write and delete group sets. An empty set leaves
//! the action open to everyone. Higher privileges imply lower ones: members
//! of a delete group may also write and read, members of a write group may
//! also read.

use crate::identity::{GroupId, User, UserId};
use crate::schema::domain::{ProjectSchema, ProjectSchemaId};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Operation class a permission check guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Viewing tasks, fields, events and transitions.
    Read,
    /// Creating, editing, transitioning and linking tasks.
    Write,
    /// Deleting tasks.
    Delete,
}

impl Action {
    /// Returns the lowercase action name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user may not perform the action on tasks of the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("user {user} may not {action} tasks of schema {schema_id}")]
pub struct PermissionDenied {
    /// Acting user.
    pub user: UserId,
    /// Schema whose group sets were consulted.
    pub schema_id: ProjectSchemaId,
    /// Denied action.
    pub action: Action,
}

/// Stateless permission gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionGate;

impl PermissionGate {
    /// Checks whether `user` may perform `action` on tasks governed by
    /// `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionDenied`] when the action's group set is not empty
    /// and the user belongs to none of the groups that grant it.
    pub fn check(
        self,
        user: &User,
        schema: &ProjectSchema,
        action: Action,
    ) -> Result<(), PermissionDenied> {
        let access = schema.access();
        let (own, granting): (&BTreeSet<GroupId>, Vec<&BTreeSet<GroupId>>) = match action {
            Action::Read => (&access.read, vec![&access.read, &access.write, &access.delete]),
            Action::Write => (&access.write, vec![&access.write, &access.delete]),
            Action::Delete => (&access.delete, vec![&access.delete]),
        };
        if own.is_empty() || granting.into_iter().any(|groups| user.is_member_of_any(groups)) {
            return Ok(());
        }
        Err(PermissionDenied {
            user: user.id(),
            schema_id: schema.id(),
            action,
        })
    }

    /// Returns `true` when [`Self::check`] would pass.
    #[must_use]
    pub fn allows(self, user: &User, schema: &ProjectSchema, action: Action) -> bool {
        self.check(user, schema, action).is_ok()
    }
}
