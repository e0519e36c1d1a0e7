//! Task management: creation, editing, workflow transitions and links.
//!
//! Tasks are numbered per project and keyed `{project key}-{number}`. Every
//! mutation is recorded as an immutable [`domain::TaskEvent`] committed with
//! the change and delivered to the schema's listeners afterwards. The module
//! follows hexagonal architecture:
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
