//! Unit tests for JSON Schema validation rules.
