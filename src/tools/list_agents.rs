use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::storage::Store;

use super::{Tool, ToolContext};

/// Enumerates the agents in the caller's default project, together with the
/// owning organisation and project rows.
pub struct ListAgentsTool {
    store: Arc<dyn Store>,
}

impl ListAgentsTool {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListAgentsTool {
    fn name(&self) -> &str {
        "list_agents"
    }

    fn description(&self) -> &str {
        "Lists all agent records from the caller's default project"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _params: Value, context: &ToolContext) -> Result<Value> {
        let toolkit = self
            .store
            .get_toolkit(context.toolkit_id)
            .await?
            .ok_or_else(|| anyhow!("toolkit {} not registered", context.toolkit_id))?;
        let organisation = self
            .store
            .get_organisation(toolkit.organisation_id)
            .await?
            .ok_or_else(|| anyhow!("organisation {} not found", toolkit.organisation_id))?;
        let project = self
            .store
            .get_project_by_organisation(organisation.id)
            .await?
            .ok_or_else(|| anyhow!("organisation {} has no project", organisation.id))?;
        let agents = self.store.list_agents(project.id).await?;

        Ok(json!({
            "organisation": organisation,
            "project": project,
            "agents": agents,
        }))
    }
}
