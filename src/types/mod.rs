pub mod agent;
pub mod execution;
pub mod resource;

pub use agent::{Agent, Organisation, Project, StepAction, ToolkitRecord, WorkflowStep};
pub use execution::{
    AgentConfig, ConfigValue, ExecutionFeed, ExecutionHandle, FeedEntry, FeedRow,
    PermissionRequest, PermissionView, ResultEnvelope, TimeDifference,
};
pub use resource::{Resource, ResourceChannel, StorageKind};

use serde::{Deserialize, Serialize};

pub type AgentId = i64;
pub type ExecutionId = i64;
pub type ResourceId = i64;
pub type OrganisationId = i64;
pub type ProjectId = i64;
pub type ToolkitId = i64;
pub type WorkflowId = i64;
pub type StepId = i64;

/// Sentinel recorded on an execution whose trigger step is not an
/// iteration-workflow reference.
pub const NO_ITERATION_STEP: StepId = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Created,
    Running,
    Waiting,
    Paused,
    Completed,
    Failed,
    Terminated,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ExecutionStatus::Created => "CREATED",
            ExecutionStatus::Running => "RUNNING",
            ExecutionStatus::Waiting => "WAITING",
            ExecutionStatus::Paused => "PAUSED",
            ExecutionStatus::Completed => "COMPLETED",
            ExecutionStatus::Failed => "FAILED",
            ExecutionStatus::Terminated => "TERMINATED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CREATED" => Some(ExecutionStatus::Created),
            "RUNNING" => Some(ExecutionStatus::Running),
            "WAITING" => Some(ExecutionStatus::Waiting),
            "PAUSED" => Some(ExecutionStatus::Paused),
            "COMPLETED" => Some(ExecutionStatus::Completed),
            "FAILED" => Some(ExecutionStatus::Failed),
            "TERMINATED" => Some(ExecutionStatus::Terminated),
            _ => None,
        }
    }

    /// Statuses the wait loop keeps polling on. Everything else ends the wait.
    pub fn is_pending(&self) -> bool {
        matches!(self, ExecutionStatus::Created | ExecutionStatus::Running)
    }
}
