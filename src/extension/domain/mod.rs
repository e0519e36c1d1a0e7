//! Extension capability contracts.

mod args;
mod capability;
mod error;

pub use args::ExtensionArgs;
pub use capability::{
    Capability, CapabilityKind, Condition, EventListener, ExtensionResult, Postfunction,
};
pub use error::ExtensionError;
