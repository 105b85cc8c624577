use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use log::info;

use crate::backend::ExecutionBackend;
use crate::error::{Error, Result};
use crate::storage::Store;
use crate::types::{AgentId, ExecutionHandle, StepAction, NO_ITERATION_STEP};

use super::resolver::ResolvedConfiguration;

/// Creates a new execution for a target agent and hands it to the host task
/// queue. Returns as soon as the handle is durably recorded and submitted;
/// progress after that is observed only through the handle's status.
pub struct ExecutionLauncher {
    store: Arc<dyn Store>,
    backend: Arc<dyn ExecutionBackend>,
}

impl ExecutionLauncher {
    pub fn new(store: Arc<dyn Store>, backend: Arc<dyn ExecutionBackend>) -> Self {
        Self { store, backend }
    }

    pub async fn launch(
        &self,
        agent_id: AgentId,
        resolved: &ResolvedConfiguration,
    ) -> Result<ExecutionHandle> {
        // The agent may have been deleted between resolution and launch.
        let agent = self
            .store
            .get_agent(agent_id)
            .await?
            .filter(|agent| agent.is_active())
            .ok_or(Error::AgentNotFound(agent_id))?;

        let start_step = self
            .store
            .trigger_step(agent.agent_workflow_id)
            .await?
            .ok_or_else(|| {
                Error::Store(anyhow!(
                    "workflow {} has no trigger step",
                    agent.agent_workflow_id
                ))
            })?;

        let iteration_step_id = match start_step.action {
            StepAction::IterationWorkflow(workflow_id) => self
                .store
                .iteration_trigger_step(workflow_id)
                .await?
                .map(|step| step.id)
                .ok_or_else(|| {
                    Error::Store(anyhow!(
                        "iteration workflow {workflow_id} has no trigger step"
                    ))
                })?,
            StepAction::Tool => NO_ITERATION_STEP,
        };

        let mut execution = ExecutionHandle::new(
            agent_id,
            resolved.agent_name.clone(),
            start_step.id,
            iteration_step_id,
        );
        execution.id = self.store.create_execution(&execution).await?;

        for (key, value) in resolved.config.iter() {
            self.store
                .upsert_execution_config(execution.id, key, value)
                .await?;
        }

        // Fire-and-forget hand-off to the execution backend.
        self.backend.submit(execution.id, Utc::now()).await?;
        info!(
            "submitted execution {} for agent {}",
            execution.id, agent_id
        );

        Ok(execution)
    }
}
