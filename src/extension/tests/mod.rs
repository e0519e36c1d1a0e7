//! Unit tests for extension resolution.

mod registry_tests;
