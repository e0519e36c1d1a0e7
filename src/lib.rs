//! Trellis: workflow and extension engine for a configurable issue tracker.
//!
//! Projects define schemas that govern how their tasks are created, edited
//! and moved between statuses. This crate decides which status transitions
//! are legal for a task, gates them behind configurable conditions, runs
//! ordered side effects around each status change, and notifies pluggable
//! listeners of every committed mutation.
//!
//! # Architecture
//!
//! Trellis follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`identity`]: Users and group memberships
//! - [`schema`]: Statuses, workflows, fields, screens and project schemas
//! - [`validation`]: JSON Schema validation of field values and configs
//! - [`extension`]: Conditions, postfunctions and event listeners
//! - [`permission`]: Group-based access checks
//! - [`task`]: Tasks, their transitions, events and links
//! - [`error`]: Error classification shared by the services

pub mod error;
pub mod extension;
pub mod identity;
pub mod permission;
pub mod schema;
pub mod task;
pub mod validation;
