//! Extension specs attached to transitions and project schemas.
//!
//! A spec names a registered extension by its symbolic class reference and
//! carries the constructor arguments plus an ordering priority. For
//! postfunctions the sign of the priority selects the execution phase:
//! negative values run before the status change is committed, zero and
//! positive values run after it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON shape every list of extension specs must satisfy before it is stored.
pub const EXTENSION_SPECS_JSON_SCHEMA: &str = r#"{
    "type": "array",
    "items": {
        "type": "object",
        "required": ["class", "priority"],
        "properties": {
            "class": {"type": "string"},
            "args": {"type": "array"},
            "kwargs": {"type": "object"},
            "priority": {"type": "integer"}
        }
    }
}"#;

/// Reference to an extension plus its constructor arguments and priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionSpec {
    #[serde(rename = "class")]
    class_ref: String,
    #[serde(default)]
    args: Vec<Value>,
    #[serde(default)]
    kwargs: Map<String, Value>,
    priority: i64,
}

impl ExtensionSpec {
    /// Creates a spec without constructor arguments.
    #[must_use]
    pub fn new(class_ref: impl Into<String>, priority: i64) -> Self {
        Self {
            class_ref: class_ref.into(),
            args: Vec::new(),
            kwargs: Map::new(),
            priority,
        }
    }

    /// Sets positional constructor arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    /// Sets keyword constructor arguments.
    #[must_use]
    pub fn with_kwargs(mut self, kwargs: Map<String, Value>) -> Self {
        self.kwargs = kwargs;
        self
    }

    /// Returns the symbolic class reference.
    #[must_use]
    pub fn class_ref(&self) -> &str {
        &self.class_ref
    }

    /// Returns positional constructor arguments.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Returns keyword constructor arguments.
    #[must_use]
    pub const fn kwargs(&self) -> &Map<String, Value> {
        &self.kwargs
    }

    /// Returns the ordering priority.
    #[must_use]
    pub const fn priority(&self) -> i64 {
        self.priority
    }

    /// Returns the execution phase selected by the priority sign.
    #[must_use]
    pub const fn phase(&self) -> ExtensionPhase {
        ExtensionPhase::of(self.priority)
    }
}

/// When a postfunction runs relative to the status commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionPhase {
    /// Runs before the new status is persisted (`priority < 0`).
    PreCommit,
    /// Runs after the new status is persisted (`priority >= 0`).
    PostCommit,
}

impl ExtensionPhase {
    /// Maps a priority to its phase.
    #[must_use]
    pub const fn of(priority: i64) -> Self {
        if priority < 0 {
            Self::PreCommit
        } else {
            Self::PostCommit
        }
    }
}

/// Returns the specs sorted by ascending priority.
///
/// The sort is stable, so specs sharing a priority keep their configured
/// order.
#[must_use]
pub fn by_priority(specs: &[ExtensionSpec]) -> Vec<&ExtensionSpec> {
    let mut ordered: Vec<&ExtensionSpec> = specs.iter().collect();
    ordered.sort_by_key(|spec| spec.priority);
    ordered
}

/// Returns the specs of one phase sorted by ascending priority.
#[must_use]
pub fn in_phase(specs: &[ExtensionSpec], phase: ExtensionPhase) -> Vec<&ExtensionSpec> {
    by_priority(specs)
        .into_iter()
        .filter(|spec| spec.phase() == phase)
        .collect()
}
