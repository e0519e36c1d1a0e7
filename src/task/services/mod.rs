//! Application services for tasks: the caller-facing [`TaskService`], the
//! [`TransitionEngine`] it delegates status changes to, and the
//! [`EventDispatcher`] that notifies listeners after each commit.

mod config;
mod error;
mod lifecycle;
mod links;
mod notification;
mod requests;
mod transition;
mod views;

pub use config::TaskServiceConfig;
pub use error::{TaskServiceError, TaskServiceResult};
pub use lifecycle::TaskService;
pub use notification::EventDispatcher;
pub use requests::{CreateTaskRequest, UpdateTaskRequest};
pub use transition::TransitionEngine;
pub use views::{FieldValueSnapshot, TaskSnapshot, TaskSummary, TransitionSummary};
