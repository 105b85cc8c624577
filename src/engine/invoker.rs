use std::sync::Arc;

use log::{info, warn};

use crate::backend::{ExecutionBackend, ResourceSummarizer};
use crate::config::Config;
use crate::resources::{BlobStore, ResourceManager};
use crate::storage::Store;
use crate::types::{AgentId, ResultEnvelope};

use super::feed::FeedAssembler;
use super::launcher::ExecutionLauncher;
use super::resolver::ConfigurationResolver;
use super::waiter::ExecutionWaiter;

/// Composition root for the cross-agent workflow: resolve configuration,
/// launch, optionally wait, assemble the feed, list the run's resources.
///
/// `invoke` never raises. Each stage's result is matched explicitly; on
/// failure the stage is logged and the envelope is returned with whatever
/// was populated so far. In particular `new_execution_id` survives any
/// post-launch failure, so the caller can always poll the run independently.
pub struct CrossAgentInvoker {
    store: Arc<dyn Store>,
    blob: Arc<dyn BlobStore>,
    summarizer: Arc<dyn ResourceSummarizer>,
    config: Config,
    resolver: ConfigurationResolver,
    launcher: ExecutionLauncher,
    waiter: ExecutionWaiter,
    feed: FeedAssembler,
}

impl CrossAgentInvoker {
    pub fn new(
        store: Arc<dyn Store>,
        execution_backend: Arc<dyn ExecutionBackend>,
        blob: Arc<dyn BlobStore>,
        summarizer: Arc<dyn ResourceSummarizer>,
        config: Config,
    ) -> Self {
        Self {
            resolver: ConfigurationResolver::new(store.clone()),
            launcher: ExecutionLauncher::new(store.clone(), execution_backend),
            waiter: ExecutionWaiter::new(store.clone(), config.wait_policy()),
            feed: FeedAssembler::new(store.clone()),
            store,
            blob,
            summarizer,
            config,
        }
    }

    pub async fn invoke(
        &self,
        target_agent_id: AgentId,
        wait_for_result: bool,
    ) -> ResultEnvelope {
        let mut envelope = ResultEnvelope::pending(target_agent_id);

        let resolved = match self.resolver.resolve(target_agent_id).await {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!("configuration resolution failed for agent {target_agent_id}: {err}");
                return envelope;
            }
        };

        let execution = match self.launcher.launch(target_agent_id, &resolved).await {
            Ok(execution) => execution,
            Err(err) => {
                warn!("launch failed for agent {target_agent_id}: {err}");
                return envelope;
            }
        };
        envelope.new_execution_id = Some(execution.id);

        if !wait_for_result {
            return envelope;
        }

        let execution_id = execution.id;
        let outcome = match self.waiter.wait(execution).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("wait failed for execution {execution_id}: {err}");
                return envelope;
            }
        };
        if outcome.timed_out {
            info!(
                "wait budget exhausted for execution {execution_id}, status still {}",
                outcome.execution.status.as_str()
            );
        }
        envelope.execution = Some(outcome.execution);

        match self.feed.assemble(execution_id).await {
            Ok(feed) => envelope.feed = Some(feed),
            Err(err) => {
                warn!("feed assembly failed for execution {execution_id}: {err}");
                return envelope;
            }
        }

        let resources = ResourceManager::new(
            target_agent_id,
            self.store.clone(),
            self.blob.clone(),
            self.summarizer.clone(),
            &self.config,
        );
        match resources.list(Some(execution_id)).await {
            Ok(listed) => envelope.resources = Some(listed),
            Err(err) => {
                warn!("resource listing failed for execution {execution_id}: {err}");
            }
        }

        envelope
    }
}
