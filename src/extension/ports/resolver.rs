//! Port turning stored extension specs into live capabilities.

use crate::extension::domain::{
    Capability, CapabilityKind, Condition, EventListener, ExtensionError, Postfunction,
};
use crate::schema::domain::ExtensionSpec;
use std::sync::Arc;
use thiserror::Error;

/// Result type for extension resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Resolves extension specs into fresh capability instances.
///
/// Implementations construct a new instance on every call; nothing is
/// cached between resolutions.
#[cfg_attr(test, mockall::automock)]
pub trait ExtensionResolver: Send + Sync {
    /// Resolves `spec` into whichever capability its class provides.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the class is unknown or its factory
    /// rejects the arguments.
    fn resolve(&self, spec: &ExtensionSpec) -> ResolveResult<Capability>;

    /// Resolves `spec` into a condition.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::WrongCapability`] when the class provides
    /// another capability.
    fn resolve_condition(&self, spec: &ExtensionSpec) -> ResolveResult<Arc<dyn Condition>> {
        match self.resolve(spec)? {
            Capability::Condition(condition) => Ok(condition),
            other => Err(ResolveError::wrong_capability(spec, CapabilityKind::Condition, &other)),
        }
    }

    /// Resolves `spec` into a postfunction.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::WrongCapability`] when the class provides
    /// another capability.
    fn resolve_postfunction(&self, spec: &ExtensionSpec) -> ResolveResult<Arc<dyn Postfunction>> {
        match self.resolve(spec)? {
            Capability::Postfunction(postfunction) => Ok(postfunction),
            other => Err(ResolveError::wrong_capability(
                spec,
                CapabilityKind::Postfunction,
                &other,
            )),
        }
    }

    /// Resolves `spec` into an event listener.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::WrongCapability`] when the class provides
    /// another capability.
    fn resolve_listener(&self, spec: &ExtensionSpec) -> ResolveResult<Arc<dyn EventListener>> {
        match self.resolve(spec)? {
            Capability::EventListener(listener) => Ok(listener),
            other => Err(ResolveError::wrong_capability(
                spec,
                CapabilityKind::EventListener,
                &other,
            )),
        }
    }
}

/// Errors returned while resolving an extension spec.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// No factory is registered under the class reference.
    #[error("unknown extension class '{0}'")]
    UnknownClass(String),

    /// The class provides a different capability than requested.
    #[error("extension class '{class_ref}' is a {actual}, expected a {expected}")]
    WrongCapability {
        /// Requested class reference.
        class_ref: String,
        /// Capability the caller needed.
        expected: CapabilityKind,
        /// Capability the factory produced.
        actual: CapabilityKind,
    },

    /// The factory rejected the spec's arguments.
    #[error("extension class '{class_ref}' could not be constructed: {source}")]
    Construction {
        /// Requested class reference.
        class_ref: String,
        /// Factory failure.
        source: ExtensionError,
    },
}

impl ResolveError {
    fn wrong_capability(
        spec: &ExtensionSpec,
        expected: CapabilityKind,
        actual: &Capability,
    ) -> Self {
        Self::WrongCapability {
            class_ref: spec.class_ref().to_owned(),
            expected,
            actual: actual.kind(),
        }
    }
}
