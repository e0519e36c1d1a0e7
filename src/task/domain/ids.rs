//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use crate::schema::domain::{ProjectKey, uuid_identifier};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

uuid_identifier!(
    /// Unique identifier for a task.
    TaskId
);
uuid_identifier!(
    /// Unique identifier for a task event.
    TaskEventId
);
uuid_identifier!(
    /// Unique identifier for a link between two tasks.
    LinkId
);

/// Per-project sequential task number, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskNumber(u64);

impl TaskNumber {
    /// Largest number representable in the `PostgreSQL` schema.
    const MAX_PERSISTED_VALUE: u64 = i64::MAX as u64;

    /// Number of the first task in a project.
    pub const FIRST: Self = Self(1);

    /// Creates a validated task number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskNumber`] when the value is zero
    /// or exceeds `i64::MAX`.
    pub const fn new(value: u64) -> Result<Self, TaskDomainError> {
        if value == 0 || value > Self::MAX_PERSISTED_VALUE {
            return Err(TaskDomainError::InvalidTaskNumber(value));
        }
        Ok(Self(value))
    }

    /// Returns the number allocated after `self`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskNumber`] when the sequence is
    /// exhausted.
    pub const fn next(self) -> Result<Self, TaskDomainError> {
        match self.0.checked_add(1) {
            Some(value) => Self::new(value),
            None => Err(TaskDomainError::InvalidTaskNumber(self.0)),
        }
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-readable task key in `{project key}-{number}` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskKey(String);

impl TaskKey {
    /// Composes the key of task `number` in the project keyed `project_key`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskKeyTooLong`] when the composed key is
    /// longer than `max_length` characters.
    pub fn compose(
        project_key: &ProjectKey,
        number: TaskNumber,
        max_length: usize,
    ) -> Result<Self, TaskDomainError> {
        let key = format!("{project_key}-{number}");
        if key.chars().count() > max_length {
            return Err(TaskDomainError::TaskKeyTooLong {
                key,
                max: max_length,
            });
        }
        Ok(Self(key))
    }

    /// Wraps a key read back from storage.
    #[must_use]
    pub const fn from_persisted(key: String) -> Self {
        Self(key)
    }

    /// Returns the key as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One-line task title, trimmed and bounded in length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Summary(String);

impl Summary {
    /// Creates a validated summary.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptySummary`] when nothing is left after
    /// trimming and [`TaskDomainError::SummaryTooLong`] when the summary has
    /// more than `max_length` characters.
    pub fn new(value: impl Into<String>, max_length: usize) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptySummary);
        }
        let length = trimmed.chars().count();
        if length > max_length {
            return Err(TaskDomainError::SummaryTooLong {
                length,
                max: max_length,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Wraps a summary read back from storage.
    #[must_use]
    pub const fn from_persisted(summary: String) -> Self {
        Self(summary)
    }

    /// Returns the summary as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
