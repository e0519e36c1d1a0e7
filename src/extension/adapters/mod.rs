//! Extension resolver adapters and built-in extensions.

mod builtin;
mod registry;

pub use builtin::{TRACING_LISTENER, TracingListener, USER_IN_GROUPS, UserInGroups};
pub use registry::{ExtensionFactory, ExtensionRegistry};
