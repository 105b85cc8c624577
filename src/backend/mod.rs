use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{AgentId, ExecutionId, ResourceId};

/// The host's asynchronous task queue. Once an execution id is submitted the
/// backend owns the run: it drives the execution's status toward a terminal
/// state by mutating the shared store. This toolkit never awaits it, only
/// re-reads the handle.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn submit(&self, execution_id: ExecutionId, submitted_at: DateTime<Utc>) -> Result<()>;
}

/// Best-effort out-of-band resource summarization. No return path is
/// consumed; failures are logged and ignored by callers.
#[async_trait]
pub trait ResourceSummarizer: Send + Sync {
    async fn summarize(&self, agent_id: AgentId, resource_id: ResourceId) -> Result<()>;
}

/// Accepts submissions and does nothing. For embeddings where the host wires
/// the queue elsewhere, and for tests that only exercise the launch path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullExecutionBackend;

#[async_trait]
impl ExecutionBackend for NullExecutionBackend {
    async fn submit(&self, _execution_id: ExecutionId, _submitted_at: DateTime<Utc>) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSummarizer;

#[async_trait]
impl ResourceSummarizer for NullSummarizer {
    async fn summarize(&self, _agent_id: AgentId, _resource_id: ResourceId) -> Result<()> {
        Ok(())
    }
}
