//! Identifier newtypes for schema registry entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Declares a UUID-backed identifier with the registry's standard surface.
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub(crate) use uuid_identifier;

uuid_identifier!(
    /// Identifier of a status category.
    StatusTypeId
);
uuid_identifier!(
    /// Identifier of a workflow status.
    StatusId
);
uuid_identifier!(
    /// Identifier of a workflow.
    WorkflowId
);
uuid_identifier!(
    /// Identifier of a workflow transition.
    TransitionId
);
uuid_identifier!(
    /// Identifier of a project.
    ProjectId
);
uuid_identifier!(
    /// Identifier of a task type.
    TaskTypeId
);
uuid_identifier!(
    /// Identifier of a project schema binding.
    ProjectSchemaId
);
uuid_identifier!(
    /// Identifier of a screen (field layout).
    ScreenId
);
uuid_identifier!(
    /// Identifier of a field definition.
    FieldId
);
uuid_identifier!(
    /// Identifier of a field type.
    FieldTypeId
);
uuid_identifier!(
    /// Identifier of a link type.
    LinkTypeId
);
