//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task number is zero or out of range.
    #[error("invalid task number {0}, expected a positive integer")]
    InvalidTaskNumber(u64),

    /// The task summary is empty after trimming.
    #[error("task summary must not be empty")]
    EmptySummary,

    /// The task summary exceeds the configured maximum.
    #[error("task summary has {length} characters, exceeds limit of {max}")]
    SummaryTooLong {
        /// Length of the rejected summary in characters.
        length: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The composed task key exceeds the configured maximum.
    #[error("task key '{key}' exceeds limit of {max} characters")]
    TaskKeyTooLong {
        /// The rejected key.
        key: String,
        /// Configured maximum.
        max: usize,
    },

    /// A link would connect a task to itself.
    #[error("a task cannot be linked to itself")]
    SelfLink,
}

/// Error returned while parsing task event types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task event type: {0}")]
pub struct ParseTaskEventTypeError(pub String);
