//! Pluggable extensions: transition conditions, postfunctions and event
//! listeners.
//!
//! Workflows and project schemas reference extensions by symbolic class
//! name. The [`ports::ExtensionResolver`] port turns those references into
//! fresh capability instances; [`adapters::ExtensionRegistry`] implements it
//! with a static table of factories.

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
