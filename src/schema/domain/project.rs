//! Projects, task types, and the schemas binding them to workflows.

use super::{
    ExtensionSpec, LinkTypeId, ProjectId, ProjectSchemaId, SchemaDomainError, ScreenId,
    TaskTypeId, WorkflowId, name::validated_name,
};
use crate::identity::GroupId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Short uppercase project key used as the prefix of task keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectKey(String);

impl ProjectKey {
    /// Creates a validated project key.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDomainError::InvalidProjectKey`] when the key is empty
    /// or contains anything other than ASCII uppercase letters and digits.
    pub fn new(value: impl Into<String>) -> Result<Self, SchemaDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let is_valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit());
        if !is_valid {
            return Err(SchemaDomainError::InvalidProjectKey(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the key as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A project owning tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    key: ProjectKey,
    name: String,
    description: Option<String>,
}

impl Project {
    /// Creates a project.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDomainError`] when the key or name is invalid.
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Result<Self, SchemaDomainError> {
        Ok(Self {
            id: ProjectId::new(),
            key: ProjectKey::new(key)?,
            name: validated_name("project", name)?,
            description: None,
        })
    }

    /// Sets the project description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project key.
    #[must_use]
    pub const fn key(&self) -> &ProjectKey {
        &self.key
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Category of work item, such as "bug" or "story".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskType {
    id: TaskTypeId,
    name: String,
    description: Option<String>,
}

impl TaskType {
    /// Creates a task type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDomainError::EmptyName`] when the name is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, SchemaDomainError> {
        Ok(Self {
            id: TaskTypeId::new(),
            name: validated_name("task type", name)?,
            description: None,
        })
    }

    /// Sets the task type description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the task type identifier.
    #[must_use]
    pub const fn id(&self) -> TaskTypeId {
        self.id
    }

    /// Returns the task type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Group sets restricting access to tasks of one schema.
///
/// An empty set leaves the corresponding action unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGroups {
    /// Groups allowed to read tasks.
    pub read: BTreeSet<GroupId>,
    /// Groups allowed to read and write tasks.
    pub write: BTreeSet<GroupId>,
    /// Groups allowed to read, write, and delete tasks.
    pub delete: BTreeSet<GroupId>,
}

/// Binding of a project and task type to a workflow, screen, listeners, and
/// access groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSchema {
    id: ProjectSchemaId,
    project_id: ProjectId,
    task_type_id: TaskTypeId,
    workflow_id: WorkflowId,
    screen_id: ScreenId,
    is_active: bool,
    event_listeners: Vec<ExtensionSpec>,
    access: AccessGroups,
}

impl ProjectSchema {
    /// Creates an inactive schema binding.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        task_type_id: TaskTypeId,
        workflow_id: WorkflowId,
        screen_id: ScreenId,
    ) -> Self {
        Self {
            id: ProjectSchemaId::new(),
            project_id,
            task_type_id,
            workflow_id,
            screen_id,
            is_active: false,
            event_listeners: Vec::new(),
            access: AccessGroups::default(),
        }
    }

    /// Sets the event listeners.
    #[must_use]
    pub fn with_event_listeners(mut self, listeners: Vec<ExtensionSpec>) -> Self {
        self.event_listeners = listeners;
        self
    }

    /// Sets the access groups.
    #[must_use]
    pub fn with_access(mut self, access: AccessGroups) -> Self {
        self.access = access;
        self
    }

    /// Sets the activation flag.
    #[must_use]
    pub const fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Returns the schema identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectSchemaId {
        self.id
    }

    /// Returns the bound project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the bound task type.
    #[must_use]
    pub const fn task_type_id(&self) -> TaskTypeId {
        self.task_type_id
    }

    /// Returns the bound workflow.
    #[must_use]
    pub const fn workflow_id(&self) -> WorkflowId {
        self.workflow_id
    }

    /// Returns the bound screen.
    #[must_use]
    pub const fn screen_id(&self) -> ScreenId {
        self.screen_id
    }

    /// Returns `true` when new tasks are created through this schema.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the event listeners in configured order.
    #[must_use]
    pub fn event_listeners(&self) -> &[ExtensionSpec] {
        &self.event_listeners
    }

    /// Returns the access groups.
    #[must_use]
    pub const fn access(&self) -> &AccessGroups {
        &self.access
    }

    /// Returns `true` when both schemas bind the same project and task type.
    #[must_use]
    pub fn binds_same_pair(&self, other: &Self) -> bool {
        self.project_id == other.project_id && self.task_type_id == other.task_type_id
    }
}

/// Named relation between two tasks, such as "blocks" / "is blocked by".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkType {
    id: LinkTypeId,
    src_name: String,
    dest_name: String,
}

impl LinkType {
    /// Creates a link type from its outward and inward names.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDomainError::EmptyName`] when either name is blank.
    pub fn new(
        src_name: impl Into<String>,
        dest_name: impl Into<String>,
    ) -> Result<Self, SchemaDomainError> {
        Ok(Self {
            id: LinkTypeId::new(),
            src_name: validated_name("link source", src_name)?,
            dest_name: validated_name("link destination", dest_name)?,
        })
    }

    /// Returns the link type identifier.
    #[must_use]
    pub const fn id(&self) -> LinkTypeId {
        self.id
    }

    /// Returns the name seen from the source task.
    #[must_use]
    pub fn src_name(&self) -> &str {
        &self.src_name
    }

    /// Returns the name seen from the destination task.
    #[must_use]
    pub fn dest_name(&self) -> &str {
        &self.dest_name
    }
}
