use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use crate::types::{
    Agent, AgentId, ConfigValue, ExecutionHandle, ExecutionId, ExecutionStatus, FeedRow,
    Organisation, OrganisationId, PermissionRequest, Project, ProjectId, Resource,
    ResourceChannel, ResourceId, StepAction, StorageKind, ToolkitId, ToolkitRecord, WorkflowId,
    WorkflowStep,
};

use super::Store;

/// `Store` over the host's Postgres schema. The schema itself is host-owned;
/// this implementation only reads it and appends execution, execution-config,
/// and resource rows.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn agent_from_row(r: &sqlx::postgres::PgRow) -> Agent {
    Agent {
        id: r.get("id"),
        name: r.get("name"),
        description: r.get("description"),
        project_id: r.get("project_id"),
        agent_workflow_id: r.get("agent_workflow_id"),
        is_deleted: r.get("is_deleted"),
    }
}

fn execution_from_row(r: &sqlx::postgres::PgRow) -> ExecutionHandle {
    let status: String = r.get("status");
    ExecutionHandle {
        id: r.get("id"),
        agent_id: r.get("agent_id"),
        name: r.get("name"),
        status: ExecutionStatus::parse(&status).unwrap_or(ExecutionStatus::Running),
        created_at: r.get("created_at"),
        last_execution_time: r.get("last_execution_time"),
        num_of_calls: r.get("num_of_calls"),
        num_of_tokens: r.get("num_of_tokens"),
        current_step_id: r.get("current_agent_step_id"),
        iteration_workflow_step_id: r.get("iteration_workflow_step_id"),
    }
}

fn resource_from_row(r: &sqlx::postgres::PgRow) -> Resource {
    let storage: String = r.get("storage_type");
    let channel: String = r.get("channel");
    Resource {
        id: r.get("id"),
        name: r.get("name"),
        path: r.get("path"),
        storage_type: StorageKind::parse(&storage).unwrap_or(StorageKind::File),
        size: r.get("size"),
        content_type: r.get("type"),
        channel: ResourceChannel::parse(&channel).unwrap_or(ResourceChannel::Input),
        agent_id: r.get("agent_id"),
        agent_execution_id: r.get("agent_execution_id"),
    }
}

fn step_from_row(r: &sqlx::postgres::PgRow) -> WorkflowStep {
    let action_type: String = r.get("action_type");
    let action = if action_type == "ITERATION_WORKFLOW" {
        let reference: Option<WorkflowId> = r.get("action_reference_id");
        StepAction::IterationWorkflow(reference.unwrap_or_default())
    } else {
        StepAction::Tool
    };
    WorkflowStep {
        id: r.get("id"),
        action,
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn get_agent(&self, id: AgentId) -> Result<Option<Agent>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, project_id, agent_workflow_id, is_deleted
            FROM agents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(agent_from_row))
    }

    async fn list_agents(&self, project_id: ProjectId) -> Result<Vec<Agent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, project_id, agent_workflow_id, is_deleted
            FROM agents
            WHERE project_id = $1
            ORDER BY id
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(agent_from_row).collect())
    }

    async fn get_toolkit(&self, id: ToolkitId) -> Result<Option<ToolkitRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, organisation_id
            FROM toolkits
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ToolkitRecord {
            id: r.get("id"),
            name: r.get("name"),
            description: r.get("description"),
            organisation_id: r.get("organisation_id"),
        }))
    }

    async fn get_organisation(&self, id: OrganisationId) -> Result<Option<Organisation>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description
            FROM organisations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Organisation {
            id: r.get("id"),
            name: r.get("name"),
            description: r.get("description"),
        }))
    }

    async fn get_project_by_organisation(
        &self,
        organisation_id: OrganisationId,
    ) -> Result<Option<Project>> {
        let row = sqlx::query(
            r#"
            SELECT id, organisation_id, name
            FROM projects
            WHERE organisation_id = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(organisation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Project {
            id: r.get("id"),
            organisation_id: r.get("organisation_id"),
            name: r.get("name"),
        }))
    }

    async fn trigger_step(&self, workflow_id: WorkflowId) -> Result<Option<WorkflowStep>> {
        let row = sqlx::query(
            r#"
            SELECT id, action_type, action_reference_id
            FROM agent_workflow_steps
            WHERE agent_workflow_id = $1 AND step_type = 'TRIGGER'
            "#,
        )
        .bind(workflow_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(step_from_row))
    }

    async fn iteration_trigger_step(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Option<WorkflowStep>> {
        let row = sqlx::query(
            r#"
            SELECT id, action_type, action_reference_id
            FROM iteration_workflow_steps
            WHERE iteration_workflow_id = $1 AND step_type = 'TRIGGER'
            "#,
        )
        .bind(workflow_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(step_from_row))
    }

    async fn create_execution(&self, execution: &ExecutionHandle) -> Result<ExecutionId> {
        let row = sqlx::query(
            r#"
            INSERT INTO agent_executions (
                agent_id, name, status, created_at, last_execution_time,
                num_of_calls, num_of_tokens, current_agent_step_id,
                iteration_workflow_step_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(execution.agent_id)
        .bind(&execution.name)
        .bind(execution.status.as_str())
        .bind(execution.created_at)
        .bind(execution.last_execution_time)
        .bind(execution.num_of_calls)
        .bind(execution.num_of_tokens)
        .bind(execution.current_step_id)
        .bind(execution.iteration_workflow_step_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    async fn get_execution(&self, id: ExecutionId) -> Result<Option<ExecutionHandle>> {
        let row = sqlx::query(
            r#"
            SELECT id, agent_id, name, status, created_at, last_execution_time,
                   num_of_calls, num_of_tokens, current_agent_step_id,
                   iteration_workflow_step_id
            FROM agent_executions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(execution_from_row))
    }

    async fn latest_execution(&self, agent_id: AgentId) -> Result<Option<ExecutionHandle>> {
        let row = sqlx::query(
            r#"
            SELECT id, agent_id, name, status, created_at, last_execution_time,
                   num_of_calls, num_of_tokens, current_agent_step_id,
                   iteration_workflow_step_id
            FROM agent_executions
            WHERE agent_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(agent_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(execution_from_row))
    }

    async fn refresh_execution(&self, execution: &mut ExecutionHandle) -> Result<()> {
        let current = self
            .get_execution(execution.id)
            .await?
            .ok_or_else(|| anyhow!("execution {} vanished from store", execution.id))?;
        *execution = current;
        Ok(())
    }

    async fn agent_configuration(&self, agent_id: AgentId) -> Result<Vec<(String, String)>> {
        let rows = sqlx::query(
            r#"
            SELECT key, value
            FROM agent_configurations
            WHERE agent_id = $1
            ORDER BY key
            "#,
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| (r.get("key"), r.get("value")))
            .collect())
    }

    async fn upsert_execution_config(
        &self,
        execution_id: ExecutionId,
        key: &str,
        value: &ConfigValue,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO agent_execution_configs (agent_execution_id, key, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (agent_execution_id, key)
            DO UPDATE SET value = EXCLUDED.value
            "#,
        )
        .bind(execution_id)
        .bind(key)
        .bind(serde_json::to_value(value)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn execution_configuration(
        &self,
        execution_id: ExecutionId,
    ) -> Result<Vec<(String, ConfigValue)>> {
        let rows = sqlx::query(
            r#"
            SELECT key, value
            FROM agent_execution_configs
            WHERE agent_execution_id = $1
            ORDER BY key
            "#,
        )
        .bind(execution_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| {
                let value: ConfigValue = serde_json::from_value(r.get("value"))?;
                Ok((r.get("key"), value))
            })
            .collect()
    }

    async fn execution_feed(&self, execution_id: ExecutionId) -> Result<Vec<FeedRow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, agent_execution_id, "role", feed, created_at, updated_at
            FROM agent_execution_feeds
            WHERE agent_execution_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(execution_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| FeedRow {
                id: r.get("id"),
                agent_execution_id: r.get("agent_execution_id"),
                role: r.get("role"),
                feed: r.get("feed"),
                created_at: r.get("created_at"),
                updated_at: r.get("updated_at"),
            })
            .collect())
    }

    async fn execution_permissions(
        &self,
        execution_id: ExecutionId,
    ) -> Result<Vec<PermissionRequest>> {
        let rows = sqlx::query(
            r#"
            SELECT id, agent_execution_id, tool_name, question, status,
                   user_feedback, created_at
            FROM agent_execution_permissions
            WHERE agent_execution_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(execution_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| PermissionRequest {
                id: r.get("id"),
                agent_execution_id: r.get("agent_execution_id"),
                tool_name: r.get("tool_name"),
                question: r.get("question"),
                status: r.get("status"),
                user_feedback: r.get("user_feedback"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    async fn create_resource(&self, resource: &Resource) -> Result<ResourceId> {
        let row = sqlx::query(
            r#"
            INSERT INTO resources (
                name, path, storage_type, size, type, channel, agent_id,
                agent_execution_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&resource.name)
        .bind(&resource.path)
        .bind(resource.storage_type.as_str())
        .bind(resource.size)
        .bind(&resource.content_type)
        .bind(resource.channel.as_str())
        .bind(resource.agent_id)
        .bind(resource.agent_execution_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    async fn get_resource(&self, id: ResourceId) -> Result<Option<Resource>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, path, storage_type, size, type, channel, agent_id,
                   agent_execution_id
            FROM resources
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(resource_from_row))
    }

    async fn list_resources(
        &self,
        agent_id: AgentId,
        execution_id: Option<ExecutionId>,
    ) -> Result<Vec<Resource>> {
        let rows = match execution_id {
            Some(execution_id) => {
                sqlx::query(
                    r#"
                    SELECT id, name, path, storage_type, size, type, channel,
                           agent_id, agent_execution_id
                    FROM resources
                    WHERE agent_id = $1 AND agent_execution_id = $2
                    ORDER BY id
                    "#,
                )
                .bind(agent_id)
                .bind(execution_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, name, path, storage_type, size, type, channel,
                           agent_id, agent_execution_id
                    FROM resources
                    WHERE agent_id = $1
                    ORDER BY id
                    "#,
                )
                .bind(agent_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.iter().map(resource_from_row).collect())
    }
}
