//! Static-table extension resolver.

use crate::extension::{
    domain::{
        Capability, Condition, EventListener, ExtensionArgs, ExtensionError, Postfunction,
    },
    ports::{ExtensionResolver, ResolveError, ResolveResult},
};
use crate::schema::domain::ExtensionSpec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Factory building a capability from constructor arguments.
pub type ExtensionFactory =
    Arc<dyn Fn(ExtensionArgs<'_>) -> Result<Capability, ExtensionError> + Send + Sync>;

/// Maps symbolic class references to extension factories.
///
/// # Examples
///
/// ```
/// use trellis::extension::{adapters::ExtensionRegistry, ports::ExtensionResolver};
/// use trellis::schema::domain::ExtensionSpec;
///
/// let registry = ExtensionRegistry::with_builtins();
/// let spec = ExtensionSpec::new("trellis.listeners.Tracing", 0);
/// assert!(registry.resolve_listener(&spec).is_ok());
/// ```
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    factories: HashMap<String, ExtensionFactory>,
}

impl ExtensionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in extensions.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::builtin::register(&mut registry);
        registry
    }

    /// Registers a raw factory. An existing entry for `class_ref` is
    /// replaced.
    pub fn register(&mut self, class_ref: impl Into<String>, factory: ExtensionFactory) {
        self.factories.insert(class_ref.into(), factory);
    }

    /// Registers a condition factory.
    pub fn register_condition<C, F>(&mut self, class_ref: impl Into<String>, factory: F)
    where
        C: Condition + 'static,
        F: Fn(ExtensionArgs<'_>) -> Result<C, ExtensionError> + Send + Sync + 'static,
    {
        self.register(
            class_ref,
            Arc::new(move |args: ExtensionArgs<'_>| -> Result<Capability, ExtensionError> {
                Ok(Capability::Condition(Arc::new(factory(args)?)))
            }),
        );
    }

    /// Registers a postfunction factory.
    pub fn register_postfunction<P, F>(&mut self, class_ref: impl Into<String>, factory: F)
    where
        P: Postfunction + 'static,
        F: Fn(ExtensionArgs<'_>) -> Result<P, ExtensionError> + Send + Sync + 'static,
    {
        self.register(
            class_ref,
            Arc::new(move |args: ExtensionArgs<'_>| -> Result<Capability, ExtensionError> {
                Ok(Capability::Postfunction(Arc::new(factory(args)?)))
            }),
        );
    }

    /// Registers an event listener factory.
    pub fn register_listener<L, F>(&mut self, class_ref: impl Into<String>, factory: F)
    where
        L: EventListener + 'static,
        F: Fn(ExtensionArgs<'_>) -> Result<L, ExtensionError> + Send + Sync + 'static,
    {
        self.register(
            class_ref,
            Arc::new(move |args: ExtensionArgs<'_>| -> Result<Capability, ExtensionError> {
                Ok(Capability::EventListener(Arc::new(factory(args)?)))
            }),
        );
    }

    /// Returns `true` when a factory is registered under `class_ref`.
    #[must_use]
    pub fn contains(&self, class_ref: &str) -> bool {
        self.factories.contains_key(class_ref)
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        classes.sort_unstable();
        f.debug_struct("ExtensionRegistry")
            .field("classes", &classes)
            .finish()
    }
}

impl ExtensionResolver for ExtensionRegistry {
    fn resolve(&self, spec: &ExtensionSpec) -> ResolveResult<Capability> {
        let factory = self
            .factories
            .get(spec.class_ref())
            .ok_or_else(|| ResolveError::UnknownClass(spec.class_ref().to_owned()))?;
        let capability =
            factory(ExtensionArgs::of(spec)).map_err(|source| ResolveError::Construction {
                class_ref: spec.class_ref().to_owned(),
                source,
            })?;
        debug!(class_ref = spec.class_ref(), kind = %capability.kind(), "resolved extension");
        Ok(capability)
    }
}
