//! Unit tests for schema registry services.
