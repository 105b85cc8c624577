use crate::types::{AgentId, ExecutionId, ResourceId};

/// Failures the toolkit surfaces to its callers. Store lookups that come
/// back empty are mapped to the typed variants here; infrastructure faults
/// ride along in `Store`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Agent with id {0} does not exist")]
    AgentNotFound(AgentId),

    #[error("Execution with id {0} does not exist")]
    ExecutionNotFound(ExecutionId),

    #[error("Resource with id {0} does not exist")]
    ResourceNotFound(ResourceId),

    #[error("File type not supported: {0}")]
    UnsupportedFileType(String),

    #[error("File not found at {0}")]
    FileNotFound(String),

    #[error("Bucket storage credentials are not configured")]
    StorageCredentialsMissing,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
