//! Borrowed view of an extension's constructor arguments.

use super::ExtensionError;
use crate::schema::domain::ExtensionSpec;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Positional and keyword arguments handed to an extension factory.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionArgs<'a> {
    args: &'a [Value],
    kwargs: &'a Map<String, Value>,
}

impl<'a> ExtensionArgs<'a> {
    /// Creates a view over explicit argument collections.
    #[must_use]
    pub const fn new(args: &'a [Value], kwargs: &'a Map<String, Value>) -> Self {
        Self { args, kwargs }
    }

    /// Creates a view over the arguments stored in `spec`.
    #[must_use]
    pub fn of(spec: &'a ExtensionSpec) -> Self {
        Self::new(spec.args(), spec.kwargs())
    }

    /// Returns the positional arguments.
    #[must_use]
    pub const fn positional(&self) -> &'a [Value] {
        self.args
    }

    /// Returns the keyword argument named `name`.
    #[must_use]
    pub fn kwarg(&self, name: &str) -> Option<&'a Value> {
        self.kwargs.get(name)
    }

    /// Deserializes the required keyword argument `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::InvalidArguments`] when the argument is
    /// missing or has the wrong shape.
    pub fn required<T: DeserializeOwned>(&self, name: &str) -> Result<T, ExtensionError> {
        let value = self
            .kwarg(name)
            .ok_or_else(|| ExtensionError::invalid_arguments(format!("missing kwarg '{name}'")))?;
        serde_json::from_value(value.clone())
            .map_err(|err| ExtensionError::invalid_arguments(format!("kwarg '{name}': {err}")))
    }
}
