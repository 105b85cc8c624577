#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use marionette::backend::ExecutionBackend;
use marionette::storage::{InMemoryStore, Store};
use marionette::types::{
    Agent, ExecutionId, ExecutionStatus, FeedRow, Organisation, Project, Resource,
    ResourceChannel, StepAction, StorageKind, ToolkitRecord, WorkflowStep,
};

pub const TOOLKIT_ID: i64 = 5;
pub const TARGET_AGENT_ID: i64 = 42;

/// Store seeded the way a host installation would be: one organisation, its
/// default project, the toolkit registration, and a launchable agent.
pub fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.add_organisation(Organisation {
        id: 1,
        name: "acme".to_string(),
        description: "test org".to_string(),
    });
    store.add_project(Project {
        id: 10,
        organisation_id: 1,
        name: "default".to_string(),
    });
    store.add_toolkit(ToolkitRecord {
        id: TOOLKIT_ID,
        name: "agent manager".to_string(),
        description: "cross-agent tools".to_string(),
        organisation_id: 1,
    });
    store.add_agent(Agent {
        id: TARGET_AGENT_ID,
        name: "researcher".to_string(),
        description: "digs things up".to_string(),
        project_id: 10,
        agent_workflow_id: 7,
        is_deleted: false,
    });
    store.set_trigger_step(
        7,
        WorkflowStep {
            id: 70,
            action: StepAction::Tool,
        },
    );
    store.add_agent_config(TARGET_AGENT_ID, "goal", "[\"find the answer\"]");
    store.add_agent_config(TARGET_AGENT_ID, "toolkits", "{1,2,3}");
    store.add_agent_config(TARGET_AGENT_ID, "constraints", "");
    store
}

/// Execution backend double that behaves like the host task queue: after a
/// fixed delay it writes some feed, drops one output resource, and drives
/// the execution to its terminal status.
pub struct ScriptedBackend {
    store: Arc<InMemoryStore>,
    delay: Duration,
    terminal: ExecutionStatus,
}

impl ScriptedBackend {
    pub fn new(store: Arc<InMemoryStore>, delay: Duration, terminal: ExecutionStatus) -> Self {
        Self {
            store,
            delay,
            terminal,
        }
    }
}

#[async_trait]
impl ExecutionBackend for ScriptedBackend {
    async fn submit(&self, execution_id: ExecutionId, _submitted_at: DateTime<Utc>) -> Result<()> {
        let store = self.store.clone();
        let delay = self.delay;
        let terminal = self.terminal;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let now = Utc::now();
            store.add_feed_row(FeedRow {
                id: 1,
                agent_execution_id: execution_id,
                role: "system".to_string(),
                feed: "The current time and date is Mon Jul  3 08:01:12 2023".to_string(),
                created_at: now,
                updated_at: now,
            });
            store.add_feed_row(FeedRow {
                id: 2,
                agent_execution_id: execution_id,
                role: "assistant".to_string(),
                feed: "Found the answer".to_string(),
                created_at: now,
                updated_at: now,
            });
            store
                .create_resource(&Resource {
                    id: 0,
                    name: "answer.txt".to_string(),
                    path: format!("workspace/input/{TARGET_AGENT_ID}/{execution_id}/answer.txt"),
                    storage_type: StorageKind::File,
                    size: 16,
                    content_type: "text/plain".to_string(),
                    channel: ResourceChannel::Output,
                    agent_id: TARGET_AGENT_ID,
                    agent_execution_id: Some(execution_id),
                })
                .await
                .unwrap();
            store.set_execution_status(execution_id, terminal);
        });
        Ok(())
    }
}
