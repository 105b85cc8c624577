pub mod blob;

pub use blob::{BlobStore, BucketStore, LocalDiskStore, MemoryBlobStore};

use std::sync::Arc;

use log::{info, warn};

use crate::backend::ResourceSummarizer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::Store;
use crate::types::{AgentId, ExecutionId, Resource, ResourceChannel, ResourceId, StorageKind};

/// Extensions the host knows how to ingest and summarize.
const ACCEPTED_FILE_TYPES: [&str; 6] = [".pdf", ".docx", ".pptx", ".csv", ".txt", ".epub"];

/// File artifact bookkeeping for one agent: upload, download, and listing,
/// over whichever blob backend the configuration selects. Unlike the launch
/// workflow these operations raise their errors outward; a silently dropped
/// upload would hide data loss from the user who initiated it.
pub struct ResourceManager {
    agent_id: AgentId,
    store: Arc<dyn Store>,
    blob: Arc<dyn BlobStore>,
    summarizer: Arc<dyn ResourceSummarizer>,
    storage_type: StorageKind,
    root_input_dir: String,
}

impl ResourceManager {
    pub fn new(
        agent_id: AgentId,
        store: Arc<dyn Store>,
        blob: Arc<dyn BlobStore>,
        summarizer: Arc<dyn ResourceSummarizer>,
        config: &Config,
    ) -> Self {
        Self {
            agent_id,
            store,
            blob,
            summarizer,
            storage_type: config.storage_type,
            root_input_dir: config.root_input_dir.clone(),
        }
    }

    pub async fn upload(
        &self,
        bytes: &[u8],
        name: &str,
        size: i64,
        content_type: &str,
        execution_id: Option<ExecutionId>,
    ) -> Result<Resource> {
        let agent = self
            .store
            .get_agent(self.agent_id)
            .await?
            .ok_or(Error::AgentNotFound(self.agent_id))?;

        if !ACCEPTED_FILE_TYPES.iter().any(|ext| name.ends_with(ext)) {
            return Err(Error::UnsupportedFileType(name.to_string()));
        }

        let directory = formatted_agent_level_path(&self.root_input_dir, agent.id, execution_id);
        let mut path = format!("{directory}/{name}");
        if self.storage_type == StorageKind::S3 {
            path = format!("resources/{path}");
        }

        self.blob.put(&path, bytes).await?;

        let mut resource = Resource {
            id: 0,
            name: name.to_string(),
            path,
            storage_type: self.storage_type,
            size,
            content_type: content_type.to_string(),
            channel: ResourceChannel::Input,
            agent_id: self.agent_id,
            agent_execution_id: execution_id,
        };
        resource.id = self.store.create_resource(&resource).await?;

        // Fire-and-forget; summarization failures never fail the upload.
        if let Err(err) = self
            .summarizer
            .summarize(self.agent_id, resource.id)
            .await
        {
            warn!(
                "summarization hand-off failed for resource {}: {err}",
                resource.id
            );
        }
        info!("uploaded resource {} at {}", resource.id, resource.path);

        Ok(resource)
    }

    pub async fn download(&self, resource_id: ResourceId) -> Result<Vec<u8>> {
        let resource = self
            .store
            .get_resource(resource_id)
            .await?
            .ok_or(Error::ResourceNotFound(resource_id))?;

        self.blob
            .get(&resource.path)
            .await?
            .ok_or(Error::FileNotFound(resource.path))
    }

    pub async fn list(&self, execution_id: Option<ExecutionId>) -> Result<Vec<Resource>> {
        Ok(self.store.list_resources(self.agent_id, execution_id).await?)
    }
}

/// Substitutes the `{agent_id}` and `{agent_execution_id}` placeholders into
/// a templated path. With no execution in scope, the execution segment is
/// dropped entirely so agent-level artifacts live one level up.
pub fn formatted_agent_level_path(
    template: &str,
    agent_id: AgentId,
    execution_id: Option<ExecutionId>,
) -> String {
    let path = template.replace("{agent_id}", &agent_id.to_string());
    match execution_id {
        Some(id) => path.replace("{agent_execution_id}", &id.to_string()),
        None => path
            .split('/')
            .filter(|segment| !segment.contains("{agent_execution_id}"))
            .collect::<Vec<_>>()
            .join("/"),
    }
}
