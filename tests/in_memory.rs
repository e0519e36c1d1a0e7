//! In-memory integration tests for the workflow engine.
//!
//! Tests are organized into modules by functionality:
//! - `workflow_tests`: Transition execution, postfunction phases, races
//! - `field_value_tests`: Field validation and atomic updates
//! - `edit_race_tests`: Concurrent edits of one task
//! - `access_tests`: Group-based access control

mod in_memory {
    pub mod helpers;

    mod access_tests;
    mod edit_race_tests;
    mod field_value_tests;
    mod workflow_tests;
}
