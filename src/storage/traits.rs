use anyhow::Result;
use async_trait::async_trait;

use crate::types::{
    Agent, AgentId, ConfigValue, ExecutionHandle, ExecutionId, FeedRow, Organisation,
    OrganisationId, PermissionRequest, Project, ProjectId, Resource, ResourceId, ToolkitId,
    ToolkitRecord, WorkflowId, WorkflowStep,
};

/// Narrow interface onto the host's persistent store. Not-found is modeled
/// as `Ok(None)`; callers decide which absences are errors.
///
/// The execution backend mutates execution rows concurrently with this
/// toolkit, so a handle held across a sleep must be re-read through
/// `refresh_execution` rather than trusted.
#[async_trait]
pub trait Store: Send + Sync {
    // Enumeration rows (host-owned, read-only here)
    async fn get_agent(&self, id: AgentId) -> Result<Option<Agent>>;
    async fn list_agents(&self, project_id: ProjectId) -> Result<Vec<Agent>>;
    async fn get_toolkit(&self, id: ToolkitId) -> Result<Option<ToolkitRecord>>;
    async fn get_organisation(&self, id: OrganisationId) -> Result<Option<Organisation>>;
    async fn get_project_by_organisation(
        &self,
        organisation_id: OrganisationId,
    ) -> Result<Option<Project>>;

    // Workflow trigger resolution
    async fn trigger_step(&self, workflow_id: WorkflowId) -> Result<Option<WorkflowStep>>;
    async fn iteration_trigger_step(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Option<WorkflowStep>>;

    // Executions
    async fn create_execution(&self, execution: &ExecutionHandle) -> Result<ExecutionId>;
    async fn get_execution(&self, id: ExecutionId) -> Result<Option<ExecutionHandle>>;
    async fn latest_execution(&self, agent_id: AgentId) -> Result<Option<ExecutionHandle>>;
    /// Re-reads the row backing `execution` in place. Errors if the row is
    /// gone, which the execution backend never does on its own.
    async fn refresh_execution(&self, execution: &mut ExecutionHandle) -> Result<()>;

    // Configuration
    async fn agent_configuration(&self, agent_id: AgentId) -> Result<Vec<(String, String)>>;
    /// Add-or-update: one row per `(execution, key)`, existing values
    /// overwritten, never duplicated.
    async fn upsert_execution_config(
        &self,
        execution_id: ExecutionId,
        key: &str,
        value: &ConfigValue,
    ) -> Result<()>;
    async fn execution_configuration(
        &self,
        execution_id: ExecutionId,
    ) -> Result<Vec<(String, ConfigValue)>>;

    // Feed and permissions, ordered by creation time ascending
    async fn execution_feed(&self, execution_id: ExecutionId) -> Result<Vec<FeedRow>>;
    async fn execution_permissions(
        &self,
        execution_id: ExecutionId,
    ) -> Result<Vec<PermissionRequest>>;

    // Resources
    async fn create_resource(&self, resource: &Resource) -> Result<ResourceId>;
    async fn get_resource(&self, id: ResourceId) -> Result<Option<Resource>>;
    async fn list_resources(
        &self,
        agent_id: AgentId,
        execution_id: Option<ExecutionId>,
    ) -> Result<Vec<Resource>>;
}
