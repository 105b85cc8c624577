use serde::{Deserialize, Serialize};

use super::{AgentId, OrganisationId, ProjectId, StepId, ToolkitId, WorkflowId};

/// A host-registered agent. Rows are owned by the host; the toolkit only
/// reads them. Soft deletion is a flag, not a row removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub description: String,
    pub project_id: ProjectId,
    pub agent_workflow_id: WorkflowId,
    pub is_deleted: bool,
}

impl Agent {
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organisation {
    pub id: OrganisationId,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub organisation_id: OrganisationId,
    pub name: String,
}

/// The toolkit registration row the host created for this plugin. It anchors
/// the caller to an organisation and, through it, a default project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolkitRecord {
    pub id: ToolkitId,
    pub name: String,
    pub description: String,
    pub organisation_id: OrganisationId,
}

/// One step of an agent workflow. The launcher only ever looks at a
/// workflow's trigger step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub id: StepId,
    pub action: StepAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepAction {
    /// A plain tool-driven step.
    Tool,
    /// The step defers to an iteration workflow; launches must also resolve
    /// that workflow's own trigger step.
    IterationWorkflow(WorkflowId),
}
