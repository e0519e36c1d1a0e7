//! Service-level errors for schema registry operations.

use crate::error::{ErrorClass, MissingEntity};
use crate::schema::{
    domain::{InvariantViolation, SchemaDomainError},
    ports::SchemaRegistryError,
};
use crate::task::ports::TaskRepositoryError;
use crate::validation::SchemaViolation;
use thiserror::Error;

/// Errors returned by [`super::SchemaRegistryService`] and
/// [`super::SchemaLookup`].
#[derive(Debug, Error)]
pub enum SchemaServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] SchemaDomainError),

    /// A JSON document failed its schema.
    #[error(transparent)]
    SchemaViolation(#[from] SchemaViolation),

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(MissingEntity),

    /// A registry invariant was violated.
    #[error(transparent)]
    InvariantViolation(InvariantViolation),

    /// Registry store operation failed.
    #[error(transparent)]
    Registry(SchemaRegistryError),

    /// Task store operation failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),
}

impl From<SchemaRegistryError> for SchemaServiceError {
    fn from(err: SchemaRegistryError) -> Self {
        match err {
            SchemaRegistryError::NotFound(entity) => Self::NotFound(entity),
            SchemaRegistryError::Invariant(violation) => Self::InvariantViolation(violation),
            other => Self::Registry(other),
        }
    }
}

impl From<InvariantViolation> for SchemaServiceError {
    fn from(violation: InvariantViolation) -> Self {
        Self::InvariantViolation(violation)
    }
}

impl SchemaServiceError {
    /// Classifies the error as a client or internal failure.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Domain(_)
            | Self::SchemaViolation(_)
            | Self::NotFound(_)
            | Self::Registry(SchemaRegistryError::DuplicateName { .. }) => ErrorClass::Client,
            Self::InvariantViolation(violation) if !violation.is_integrity_failure() => {
                ErrorClass::Client
            }
            Self::InvariantViolation(_) | Self::Registry(_) | Self::Tasks(_) => {
                ErrorClass::Internal
            }
        }
    }
}

/// Result type for schema service operations.
pub type SchemaServiceResult<T> = Result<T, SchemaServiceError>;
