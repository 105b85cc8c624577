use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::Error;
use crate::storage::Store;

use super::{Tool, ToolContext};

/// Returns the calling agent's own row as a structured snapshot.
pub struct CurrentAgentTool {
    store: Arc<dyn Store>,
}

impl CurrentAgentTool {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CurrentAgentTool {
    fn name(&self) -> &str {
        "current_agent"
    }

    fn description(&self) -> &str {
        "Returns the current agent record as JSON"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _params: Value, context: &ToolContext) -> Result<Value> {
        let agent = self
            .store
            .get_agent(context.agent_id)
            .await?
            .ok_or(Error::AgentNotFound(context.agent_id))?;
        Ok(serde_json::to_value(agent)?)
    }
}
