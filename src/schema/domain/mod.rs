//! Domain model for the schema registry.
//!
//! Statuses, workflows, fields, screens and project schemas are plain values
//! validated at construction. Cross-entity invariants (one initial transition
//! per workflow, one active schema per project and task type) are enforced by
//! the registry service and re-checked by the store.

mod error;
mod extension;
mod field;
mod ids;
mod name;
mod project;
mod status;
mod workflow;

pub use error::{InvariantViolation, SchemaDomainError};
pub use extension::{
    EXTENSION_SPECS_JSON_SCHEMA, ExtensionPhase, ExtensionSpec, by_priority, in_phase,
};
pub use field::{Field, FieldSnapshot, FieldType, Screen, ScreenField};
pub use ids::{
    FieldId, FieldTypeId, LinkTypeId, ProjectId, ProjectSchemaId, ScreenId, StatusId,
    StatusTypeId, TaskTypeId, TransitionId, WorkflowId,
};
pub(crate) use ids::uuid_identifier;
pub use project::{AccessGroups, LinkType, Project, ProjectKey, ProjectSchema, TaskType};
pub use status::{Status, StatusSnapshot, StatusType, StatusTypeSnapshot};
pub use workflow::{Transition, Workflow, WorkflowGraph};
