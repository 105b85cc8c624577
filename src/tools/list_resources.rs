use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::storage::Store;

use super::{Tool, ToolContext};

/// Lists the calling agent's file artifacts, optionally scoped to one
/// execution.
pub struct ListResourcesTool {
    store: Arc<dyn Store>,
}

impl ListResourcesTool {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListResourcesTool {
    fn name(&self) -> &str {
        "list_resources"
    }

    fn description(&self) -> &str {
        "Lists the agent's resource files, optionally filtered to one execution"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "agent_execution_id": {
                    "type": "integer",
                    "description": "Restrict the listing to this execution"
                }
            },
            "required": []
        })
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> Result<Value> {
        let execution_id = params["agent_execution_id"].as_i64();
        let resources = self
            .store
            .list_resources(context.agent_id, execution_id)
            .await?;
        Ok(serde_json::to_value(resources)?)
    }
}
