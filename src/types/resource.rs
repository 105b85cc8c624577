use serde::{Deserialize, Serialize};

use super::{AgentId, ExecutionId, ResourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageKind {
    File,
    S3,
}

impl StorageKind {
    pub fn as_str(&self) -> &str {
        match self {
            StorageKind::File => "FILE",
            StorageKind::S3 => "S3",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "FILE" => Some(StorageKind::File),
            "S3" => Some(StorageKind::S3),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceChannel {
    Input,
    Output,
}

impl ResourceChannel {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceChannel::Input => "INPUT",
            ResourceChannel::Output => "OUTPUT",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "INPUT" => Some(ResourceChannel::Input),
            "OUTPUT" => Some(ResourceChannel::Output),
            _ => None,
        }
    }
}

/// A file artifact consumed or produced by an agent. `agent_execution_id` of
/// `None` means agent-level, not scoped to one execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub path: String,
    pub storage_type: StorageKind,
    pub size: i64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub channel: ResourceChannel,
    pub agent_id: AgentId,
    pub agent_execution_id: Option<ExecutionId>,
}
