//! Statuses and status categories.

use super::{SchemaDomainError, StatusId, StatusTypeId, name::validated_name};
use serde::{Deserialize, Serialize};

/// Named category of statuses such as "open" or "closed".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusType {
    id: StatusTypeId,
    name: String,
}

impl StatusType {
    /// Creates a status category.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDomainError::EmptyName`] when the name is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, SchemaDomainError> {
        Ok(Self {
            id: StatusTypeId::new(),
            name: validated_name("status type", name)?,
        })
    }

    /// Returns the status type identifier.
    #[must_use]
    pub const fn id(&self) -> StatusTypeId {
        self.id
    }

    /// Returns the status type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A named state a task can occupy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    id: StatusId,
    name: String,
    status_type: StatusType,
}

impl Status {
    /// Creates a status in the given category.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDomainError::EmptyName`] when the name is blank.
    pub fn new(name: impl Into<String>, status_type: StatusType) -> Result<Self, SchemaDomainError> {
        Ok(Self {
            id: StatusId::new(),
            name: validated_name("status", name)?,
            status_type,
        })
    }

    /// Returns the status identifier.
    #[must_use]
    pub const fn id(&self) -> StatusId {
        self.id
    }

    /// Returns the status name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the category of the status.
    #[must_use]
    pub const fn status_type(&self) -> &StatusType {
        &self.status_type
    }

    /// Returns the serialized form recorded in status-change events.
    #[must_use]
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            id: self.id,
            name: self.name.clone(),
            status_type: StatusTypeSnapshot {
                id: self.status_type.id,
                name: self.status_type.name.clone(),
            },
        }
    }
}

/// Serialized status captured in events and task snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Status identifier.
    pub id: StatusId,
    /// Status name at capture time.
    pub name: String,
    /// Status category at capture time.
    pub status_type: StatusTypeSnapshot,
}

/// Serialized status category nested in a [`StatusSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTypeSnapshot {
    /// Status type identifier.
    pub id: StatusTypeId,
    /// Status type name at capture time.
    pub name: String,
}
