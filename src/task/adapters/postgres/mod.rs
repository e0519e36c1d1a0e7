//! `PostgreSQL` adapters for task persistence.
//!
//! Tables are created by the migrations under `migrations/`.

mod conversion;
mod models;
mod repository;
mod schema;

pub use repository::{PostgresTaskRepository, TaskPgPool};
