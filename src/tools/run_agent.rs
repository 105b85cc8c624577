use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::engine::CrossAgentInvoker;

use super::registry::RegistrySnapshot;
use super::{Tool, ToolContext};

/// Launches another agent in the same installation and, when asked, waits
/// for its result envelope. The available-agent listing is baked in from a
/// registry snapshot at construction; refresh the snapshot and rebuild the
/// tool to pick up newly registered agents.
pub struct RunAgentTool {
    invoker: Arc<CrossAgentInvoker>,
    description: String,
}

impl RunAgentTool {
    pub fn new(invoker: Arc<CrossAgentInvoker>, snapshot: &RegistrySnapshot) -> Self {
        let description = format!(
            "Creates a new run for the specified agent, starts it, and optionally \
             waits for the result.\nAvailable agents (id, name, description):\n{}",
            snapshot.listing()
        );
        Self {
            invoker,
            description,
        }
    }
}

#[async_trait]
impl Tool for RunAgentTool {
    fn name(&self) -> &str {
        "run_agent"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "target_agent_id": {
                    "type": "integer",
                    "description": "The id of the agent to execute"
                },
                "wait_for_result": {
                    "type": "boolean",
                    "description": "(Recommended: true) Wait for the agent to finish and return its feed and resources"
                }
            },
            "required": ["target_agent_id", "wait_for_result"]
        })
    }

    async fn execute(&self, params: Value, _context: &ToolContext) -> Result<Value> {
        let target_agent_id = params["target_agent_id"]
            .as_i64()
            .ok_or_else(|| anyhow!("Missing target_agent_id parameter"))?;
        let wait_for_result = params["wait_for_result"].as_bool().unwrap_or(true);

        let envelope = self.invoker.invoke(target_agent_id, wait_for_result).await;
        Ok(serde_json::to_value(envelope)?)
    }
}
