//! Extension resolution port.

mod resolver;

#[cfg(test)]
pub use resolver::MockExtensionResolver;
pub use resolver::{ExtensionResolver, ResolveError, ResolveResult};
