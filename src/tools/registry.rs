use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::storage::Store;
use crate::types::{AgentId, ToolkitId};

/// One discovered agent, reduced to what a calling agent needs to pick a
/// target.
#[derive(Debug, Clone, Serialize)]
pub struct AgentDescriptor {
    pub id: AgentId,
    pub name: String,
    pub description: String,
}

/// Immutable point-in-time view of the agents reachable from one toolkit
/// registration. A stale snapshot is refreshed by taking a new one; nothing
/// mutates shared state as a side effect of construction.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub taken_at: DateTime<Utc>,
    pub agents: Vec<AgentDescriptor>,
}

impl RegistrySnapshot {
    /// One line per agent, for embedding in a tool description.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for agent in &self.agents {
            let _ = writeln!(out, "{}, {}, {}", agent.id, agent.name, agent.description);
        }
        out
    }
}

/// Resolves the toolkit → organisation → default project chain and lists the
/// project's live agents as descriptors.
pub struct AgentRegistry {
    store: Arc<dyn Store>,
}

impl AgentRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn refresh(&self, toolkit_id: ToolkitId) -> Result<RegistrySnapshot> {
        let toolkit = self
            .store
            .get_toolkit(toolkit_id)
            .await?
            .ok_or_else(|| Error::Store(anyhow!("toolkit {toolkit_id} not registered")))?;
        let project = self
            .store
            .get_project_by_organisation(toolkit.organisation_id)
            .await?
            .ok_or_else(|| {
                Error::Store(anyhow!(
                    "organisation {} has no project",
                    toolkit.organisation_id
                ))
            })?;

        let agents = self
            .store
            .list_agents(project.id)
            .await?
            .into_iter()
            .filter(|agent| agent.is_active())
            .map(|agent| AgentDescriptor {
                id: agent.id,
                name: agent.name,
                description: agent.description,
            })
            .collect();

        Ok(RegistrySnapshot {
            taken_at: Utc::now(),
            agents,
        })
    }
}
