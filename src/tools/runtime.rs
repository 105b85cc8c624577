use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use crate::engine::CrossAgentInvoker;
use crate::storage::Store;

use super::current_agent::CurrentAgentTool;
use super::list_agents::ListAgentsTool;
use super::list_resources::ListResourcesTool;
use super::registry::RegistrySnapshot;
use super::run_agent::RunAgentTool;
use super::{Tool, ToolContext};

/// Name-keyed registry of the toolkit's tools, built once per registry
/// snapshot.
pub struct ToolRuntime {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRuntime {
    pub fn new(
        store: Arc<dyn Store>,
        invoker: Arc<CrossAgentInvoker>,
        snapshot: &RegistrySnapshot,
    ) -> Self {
        let mut tools: HashMap<String, Box<dyn Tool>> = HashMap::new();

        let run_agent = RunAgentTool::new(invoker, snapshot);
        tools.insert(run_agent.name().to_string(), Box::new(run_agent));

        let list_agents = ListAgentsTool::new(store.clone());
        tools.insert(list_agents.name().to_string(), Box::new(list_agents));

        let current_agent = CurrentAgentTool::new(store.clone());
        tools.insert(current_agent.name().to_string(), Box::new(current_agent));

        let list_resources = ListResourcesTool::new(store);
        tools.insert(list_resources.name().to_string(), Box::new(list_resources));

        Self { tools }
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn get_schemas(&self) -> Vec<Value> {
        self.names()
            .into_iter()
            .map(|name| {
                let tool = &self.tools[name];
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters_schema(),
                })
            })
            .collect()
    }

    pub async fn execute(
        &self,
        name: &str,
        params: Value,
        context: &ToolContext,
    ) -> Result<Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| anyhow!("Unknown tool: {name}"))?;
        tool.execute(params, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{NullExecutionBackend, NullSummarizer};
    use crate::config::Config;
    use crate::resources::MemoryBlobStore;
    use crate::storage::InMemoryStore;
    use crate::tools::registry::AgentDescriptor;
    use chrono::Utc;

    fn runtime() -> ToolRuntime {
        let store = Arc::new(InMemoryStore::new());
        let invoker = Arc::new(CrossAgentInvoker::new(
            store.clone(),
            Arc::new(NullExecutionBackend),
            Arc::new(MemoryBlobStore::new()),
            Arc::new(NullSummarizer),
            Config::default(),
        ));
        let snapshot = RegistrySnapshot {
            taken_at: Utc::now(),
            agents: vec![AgentDescriptor {
                id: 42,
                name: "researcher".to_string(),
                description: "digs things up".to_string(),
            }],
        };
        ToolRuntime::new(store, invoker, &snapshot)
    }

    #[test]
    fn test_runtime_registers_all_tools() {
        let runtime = runtime();
        assert_eq!(
            runtime.names(),
            vec![
                "current_agent",
                "list_agents",
                "list_resources",
                "run_agent"
            ]
        );
    }

    #[test]
    fn test_schemas_have_required_fields() {
        let runtime = runtime();
        let schemas = runtime.get_schemas();

        assert_eq!(schemas.len(), 4);
        for schema in &schemas {
            assert!(schema.get("name").is_some());
            assert!(schema.get("description").is_some());
            let params = schema.get("parameters").unwrap();
            assert_eq!(params.get("type").unwrap(), "object");
            assert!(params.get("properties").is_some());
            assert!(params.get("required").is_some());
        }
    }

    #[test]
    fn test_run_agent_description_embeds_listing() {
        let runtime = runtime();
        let schemas = runtime.get_schemas();
        let run_agent = schemas
            .iter()
            .find(|s| s["name"] == "run_agent")
            .unwrap();
        let description = run_agent["description"].as_str().unwrap();
        assert!(description.contains("42, researcher, digs things up"));
    }

    #[tokio::test]
    async fn test_unknown_tool_rejected() {
        let runtime = runtime();
        let context = ToolContext {
            agent_id: 1,
            execution_id: None,
            toolkit_id: 5,
        };
        assert!(runtime
            .execute("fly_to_moon", json!({}), &context)
            .await
            .is_err());
    }
}
