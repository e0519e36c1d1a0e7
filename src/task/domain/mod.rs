//! Domain model for tasks and their audit trail.
//!
//! A task is numbered per project, sits in one status of its schema's
//! workflow and owns its field values and events. Links relate tasks to each
//! other. All infrastructure concerns stay outside the domain boundary.

mod error;
mod event;
mod field_value;
mod ids;
mod link;
mod task;

pub use error::{ParseTaskEventTypeError, TaskDomainError};
pub use event::{PersistedTaskEventData, TaskEvent, TaskEventType};
pub use field_value::FieldValue;
pub use ids::{LinkId, Summary, TaskEventId, TaskId, TaskKey, TaskNumber};
pub use link::Link;
pub use task::{PersistedTaskData, Task, TaskPlacement};
