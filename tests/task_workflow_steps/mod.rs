//! Step definitions for task workflow BDD scenarios.

#[path = "../in_memory/helpers.rs"]
pub mod helpers;

pub mod given;
pub mod then;
pub mod when;
pub mod world;
