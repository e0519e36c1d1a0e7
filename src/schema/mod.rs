//! Schema registry: statuses, workflows, fields, screens and project schemas.
//!
//! A project schema binds a project and task type to the workflow that moves
//! its tasks between statuses, the screen listing their fields, the listeners
//! notified of changes and the groups allowed to read, write and delete them.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
