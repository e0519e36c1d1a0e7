//! Workflows and their transition graphs.

use super::{
    ExtensionSpec, SchemaDomainError, StatusId, TransitionId, WorkflowId, name::validated_name,
};
use serde::{Deserialize, Serialize};

/// Named container of transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    id: WorkflowId,
    name: String,
}

impl Workflow {
    /// Creates an empty workflow.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDomainError::EmptyName`] when the name is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, SchemaDomainError> {
        Ok(Self {
            id: WorkflowId::new(),
            name: validated_name("workflow", name)?,
        })
    }

    /// Returns the workflow identifier.
    #[must_use]
    pub const fn id(&self) -> WorkflowId {
        self.id
    }

    /// Returns the workflow name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Directed, guarded edge between two statuses of one workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    id: TransitionId,
    workflow_id: WorkflowId,
    name: String,
    src_status: Option<StatusId>,
    dest_status: StatusId,
    is_initial: bool,
    conditions: Vec<ExtensionSpec>,
    postfunctions: Vec<ExtensionSpec>,
}

impl Transition {
    /// Creates a regular transition.
    ///
    /// A `src_status` of `None` makes the transition available from any
    /// status.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDomainError::EmptyName`] when the name is blank.
    pub fn new(
        workflow_id: WorkflowId,
        name: impl Into<String>,
        src_status: Option<StatusId>,
        dest_status: StatusId,
    ) -> Result<Self, SchemaDomainError> {
        Ok(Self {
            id: TransitionId::new(),
            workflow_id,
            name: validated_name("transition", name)?,
            src_status,
            dest_status,
            is_initial: false,
            conditions: Vec::new(),
            postfunctions: Vec::new(),
        })
    }

    /// Creates the transition used to place new tasks in `dest_status`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDomainError::EmptyName`] when the name is blank.
    pub fn initial(
        workflow_id: WorkflowId,
        name: impl Into<String>,
        dest_status: StatusId,
    ) -> Result<Self, SchemaDomainError> {
        let mut transition = Self::new(workflow_id, name, None, dest_status)?;
        transition.is_initial = true;
        Ok(transition)
    }

    /// Sets the guard conditions.
    #[must_use]
    pub fn with_conditions(mut self, conditions: Vec<ExtensionSpec>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Sets the postfunctions.
    #[must_use]
    pub fn with_postfunctions(mut self, postfunctions: Vec<ExtensionSpec>) -> Self {
        self.postfunctions = postfunctions;
        self
    }

    /// Returns the transition identifier.
    #[must_use]
    pub const fn id(&self) -> TransitionId {
        self.id
    }

    /// Returns the owning workflow.
    #[must_use]
    pub const fn workflow_id(&self) -> WorkflowId {
        self.workflow_id
    }

    /// Returns the transition name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the source status, or `None` for "any status".
    #[must_use]
    pub const fn src_status(&self) -> Option<StatusId> {
        self.src_status
    }

    /// Returns the destination status.
    #[must_use]
    pub const fn dest_status(&self) -> StatusId {
        self.dest_status
    }

    /// Returns `true` for the task-creation transition.
    #[must_use]
    pub const fn is_initial(&self) -> bool {
        self.is_initial
    }

    /// Returns the guard conditions in configured order.
    #[must_use]
    pub fn conditions(&self) -> &[ExtensionSpec] {
        &self.conditions
    }

    /// Returns the postfunctions in configured order.
    #[must_use]
    pub fn postfunctions(&self) -> &[ExtensionSpec] {
        &self.postfunctions
    }

    /// Returns `true` when the edge leaves `status` and may be taken by a
    /// caller (initial transitions never qualify).
    #[must_use]
    pub fn leaves(&self, status: StatusId) -> bool {
        !self.is_initial && self.src_status.is_none_or(|src| src == status)
    }
}

/// A workflow together with its full transition set in definition order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowGraph {
    workflow: Workflow,
    transitions: Vec<Transition>,
}

impl WorkflowGraph {
    /// Creates a graph from a workflow and its transitions.
    #[must_use]
    pub const fn new(workflow: Workflow, transitions: Vec<Transition>) -> Self {
        Self {
            workflow,
            transitions,
        }
    }

    /// Returns the workflow.
    #[must_use]
    pub const fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Returns every transition in definition order.
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Returns the unique initial transition, if defined.
    #[must_use]
    pub fn initial_transition(&self) -> Option<&Transition> {
        self.transitions.iter().find(|transition| transition.is_initial())
    }

    /// Returns the non-initial transitions leaving `status`, in definition
    /// order, before any guard is evaluated.
    pub fn outgoing(&self, status: StatusId) -> impl Iterator<Item = &Transition> {
        self.transitions
            .iter()
            .filter(move |transition| transition.leaves(status))
    }
}
