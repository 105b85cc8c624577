use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::types::{
    Agent, AgentId, ConfigValue, ExecutionHandle, ExecutionId, ExecutionStatus, FeedRow,
    Organisation, OrganisationId, PermissionRequest, Project, ProjectId, Resource, ResourceId,
    ToolkitId, ToolkitRecord, WorkflowId, WorkflowStep,
};

use super::Store;

/// In-process store, usable both as a test double and as a standalone
/// embedding without a database. Host-owned rows (agents, projects, feeds)
/// are seeded through the inherent `add_*`/`set_*` methods; the `Store`
/// trait carries only what the toolkit itself reads and writes.
#[derive(Clone)]
pub struct InMemoryStore {
    agents: Arc<RwLock<HashMap<AgentId, Agent>>>,
    organisations: Arc<RwLock<HashMap<OrganisationId, Organisation>>>,
    projects: Arc<RwLock<HashMap<ProjectId, Project>>>,
    toolkits: Arc<RwLock<HashMap<ToolkitId, ToolkitRecord>>>,
    trigger_steps: Arc<RwLock<HashMap<WorkflowId, WorkflowStep>>>,
    iteration_trigger_steps: Arc<RwLock<HashMap<WorkflowId, WorkflowStep>>>,
    executions: Arc<RwLock<HashMap<ExecutionId, ExecutionHandle>>>,
    agent_configs: Arc<RwLock<HashMap<AgentId, Vec<(String, String)>>>>,
    execution_configs: Arc<RwLock<HashMap<ExecutionId, BTreeMap<String, ConfigValue>>>>,
    feeds: Arc<RwLock<Vec<FeedRow>>>,
    permissions: Arc<RwLock<Vec<PermissionRequest>>>,
    resources: Arc<RwLock<HashMap<ResourceId, Resource>>>,
    next_execution_id: Arc<AtomicI64>,
    next_resource_id: Arc<AtomicI64>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            agents: Arc::new(RwLock::new(HashMap::new())),
            organisations: Arc::new(RwLock::new(HashMap::new())),
            projects: Arc::new(RwLock::new(HashMap::new())),
            toolkits: Arc::new(RwLock::new(HashMap::new())),
            trigger_steps: Arc::new(RwLock::new(HashMap::new())),
            iteration_trigger_steps: Arc::new(RwLock::new(HashMap::new())),
            executions: Arc::new(RwLock::new(HashMap::new())),
            agent_configs: Arc::new(RwLock::new(HashMap::new())),
            execution_configs: Arc::new(RwLock::new(HashMap::new())),
            feeds: Arc::new(RwLock::new(Vec::new())),
            permissions: Arc::new(RwLock::new(Vec::new())),
            resources: Arc::new(RwLock::new(HashMap::new())),
            next_execution_id: Arc::new(AtomicI64::new(1)),
            next_resource_id: Arc::new(AtomicI64::new(1)),
        }
    }

    pub fn add_agent(&self, agent: Agent) {
        self.agents.write().unwrap().insert(agent.id, agent);
    }

    pub fn add_organisation(&self, organisation: Organisation) {
        self.organisations
            .write()
            .unwrap()
            .insert(organisation.id, organisation);
    }

    pub fn add_project(&self, project: Project) {
        self.projects.write().unwrap().insert(project.id, project);
    }

    pub fn add_toolkit(&self, toolkit: ToolkitRecord) {
        self.toolkits.write().unwrap().insert(toolkit.id, toolkit);
    }

    pub fn set_trigger_step(&self, workflow_id: WorkflowId, step: WorkflowStep) {
        self.trigger_steps.write().unwrap().insert(workflow_id, step);
    }

    pub fn set_iteration_trigger_step(&self, workflow_id: WorkflowId, step: WorkflowStep) {
        self.iteration_trigger_steps
            .write()
            .unwrap()
            .insert(workflow_id, step);
    }

    pub fn add_agent_config(&self, agent_id: AgentId, key: &str, value: &str) {
        self.agent_configs
            .write()
            .unwrap()
            .entry(agent_id)
            .or_default()
            .push((key.to_string(), value.to_string()));
    }

    pub fn add_feed_row(&self, row: FeedRow) {
        self.feeds.write().unwrap().push(row);
    }

    pub fn add_permission(&self, permission: PermissionRequest) {
        self.permissions.write().unwrap().push(permission);
    }

    /// Stands in for the execution backend's status writes in tests.
    pub fn set_execution_status(&self, execution_id: ExecutionId, status: ExecutionStatus) {
        if let Some(execution) = self.executions.write().unwrap().get_mut(&execution_id) {
            execution.status = status;
        }
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_agent(&self, id: AgentId) -> Result<Option<Agent>> {
        Ok(self.agents.read().unwrap().get(&id).cloned())
    }

    async fn list_agents(&self, project_id: ProjectId) -> Result<Vec<Agent>> {
        let mut agents: Vec<Agent> = self
            .agents
            .read()
            .unwrap()
            .values()
            .filter(|a| a.project_id == project_id)
            .cloned()
            .collect();
        agents.sort_by_key(|a| a.id);
        Ok(agents)
    }

    async fn get_toolkit(&self, id: ToolkitId) -> Result<Option<ToolkitRecord>> {
        Ok(self.toolkits.read().unwrap().get(&id).cloned())
    }

    async fn get_organisation(&self, id: OrganisationId) -> Result<Option<Organisation>> {
        Ok(self.organisations.read().unwrap().get(&id).cloned())
    }

    async fn get_project_by_organisation(
        &self,
        organisation_id: OrganisationId,
    ) -> Result<Option<Project>> {
        let mut projects: Vec<Project> = self
            .projects
            .read()
            .unwrap()
            .values()
            .filter(|p| p.organisation_id == organisation_id)
            .cloned()
            .collect();
        projects.sort_by_key(|p| p.id);
        Ok(projects.into_iter().next())
    }

    async fn trigger_step(&self, workflow_id: WorkflowId) -> Result<Option<WorkflowStep>> {
        Ok(self.trigger_steps.read().unwrap().get(&workflow_id).cloned())
    }

    async fn iteration_trigger_step(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Option<WorkflowStep>> {
        Ok(self
            .iteration_trigger_steps
            .read()
            .unwrap()
            .get(&workflow_id)
            .cloned())
    }

    async fn create_execution(&self, execution: &ExecutionHandle) -> Result<ExecutionId> {
        let id = self.next_execution_id.fetch_add(1, Ordering::SeqCst);
        let mut stored = execution.clone();
        stored.id = id;
        self.executions.write().unwrap().insert(id, stored);
        Ok(id)
    }

    async fn get_execution(&self, id: ExecutionId) -> Result<Option<ExecutionHandle>> {
        Ok(self.executions.read().unwrap().get(&id).cloned())
    }

    async fn latest_execution(&self, agent_id: AgentId) -> Result<Option<ExecutionHandle>> {
        let executions = self.executions.read().unwrap();
        let mut latest: Option<&ExecutionHandle> = None;
        for execution in executions.values().filter(|e| e.agent_id == agent_id) {
            match latest {
                Some(best) if best.created_at >= execution.created_at => {}
                _ => latest = Some(execution),
            }
        }
        Ok(latest.cloned())
    }

    async fn refresh_execution(&self, execution: &mut ExecutionHandle) -> Result<()> {
        let executions = self.executions.read().unwrap();
        let current = executions
            .get(&execution.id)
            .ok_or_else(|| anyhow!("execution {} vanished from store", execution.id))?;
        *execution = current.clone();
        Ok(())
    }

    async fn agent_configuration(&self, agent_id: AgentId) -> Result<Vec<(String, String)>> {
        Ok(self
            .agent_configs
            .read()
            .unwrap()
            .get(&agent_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn upsert_execution_config(
        &self,
        execution_id: ExecutionId,
        key: &str,
        value: &ConfigValue,
    ) -> Result<()> {
        self.execution_configs
            .write()
            .unwrap()
            .entry(execution_id)
            .or_default()
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn execution_configuration(
        &self,
        execution_id: ExecutionId,
    ) -> Result<Vec<(String, ConfigValue)>> {
        Ok(self
            .execution_configs
            .read()
            .unwrap()
            .get(&execution_id)
            .map(|configs| configs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn execution_feed(&self, execution_id: ExecutionId) -> Result<Vec<FeedRow>> {
        let mut rows: Vec<FeedRow> = self
            .feeds
            .read()
            .unwrap()
            .iter()
            .filter(|row| row.agent_execution_id == execution_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.created_at, row.id));
        Ok(rows)
    }

    async fn execution_permissions(
        &self,
        execution_id: ExecutionId,
    ) -> Result<Vec<PermissionRequest>> {
        let mut rows: Vec<PermissionRequest> = self
            .permissions
            .read()
            .unwrap()
            .iter()
            .filter(|row| row.agent_execution_id == execution_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.created_at, row.id));
        Ok(rows)
    }

    async fn create_resource(&self, resource: &Resource) -> Result<ResourceId> {
        let id = self.next_resource_id.fetch_add(1, Ordering::SeqCst);
        let mut stored = resource.clone();
        stored.id = id;
        self.resources.write().unwrap().insert(id, stored);
        Ok(id)
    }

    async fn get_resource(&self, id: ResourceId) -> Result<Option<Resource>> {
        Ok(self.resources.read().unwrap().get(&id).cloned())
    }

    async fn list_resources(
        &self,
        agent_id: AgentId,
        execution_id: Option<ExecutionId>,
    ) -> Result<Vec<Resource>> {
        let mut resources: Vec<Resource> = self
            .resources
            .read()
            .unwrap()
            .values()
            .filter(|r| {
                r.agent_id == agent_id
                    && execution_id.map_or(true, |id| r.agent_execution_id == Some(id))
            })
            .cloned()
            .collect();
        resources.sort_by_key(|r| r.id);
        Ok(resources)
    }
}
