pub mod current_agent;
pub mod list_agents;
pub mod list_resources;
pub mod registry;
pub mod run_agent;
pub mod runtime;

pub use registry::{AgentDescriptor, AgentRegistry, RegistrySnapshot};
pub use runtime::ToolRuntime;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::types::{AgentId, ExecutionId, ToolkitId};

/// Identity the host supplies for each tool invocation: which agent is
/// calling, from which of its executions, under which toolkit registration.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub agent_id: AgentId,
    pub execution_id: Option<ExecutionId>,
    pub toolkit_id: ToolkitId,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;

    async fn execute(&self, params: Value, context: &ToolContext) -> Result<Value>;
}
