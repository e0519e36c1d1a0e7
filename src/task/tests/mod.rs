//! Unit tests for the task domain, repository and services.

mod support;
