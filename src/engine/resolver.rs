use std::sync::Arc;

use anyhow::{anyhow, Context};

use crate::error::{Error, Result};
use crate::storage::Store;
use crate::types::{AgentConfig, AgentId, ConfigValue};

/// The parameter set a new execution of one agent starts with, plus the
/// agent's name for the run record.
#[derive(Debug, Clone)]
pub struct ResolvedConfiguration {
    pub agent_name: String,
    pub config: AgentConfig,
}

/// Rebuilds the full launch configuration for a target agent from its
/// persistent configuration rows. The agent's most recent prior execution is
/// consulted only as a consistency check; its values are never reused
/// directly.
pub struct ConfigurationResolver {
    store: Arc<dyn Store>,
}

impl ConfigurationResolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, agent_id: AgentId) -> Result<ResolvedConfiguration> {
        let agent = self
            .store
            .get_agent(agent_id)
            .await?
            .filter(|agent| agent.is_active())
            .ok_or(Error::AgentNotFound(agent_id))?;

        if let Some(previous) = self.store.latest_execution(agent_id).await? {
            if previous.agent_id != agent_id {
                return Err(Error::Store(anyhow!(
                    "execution {} does not belong to agent {}",
                    previous.id,
                    agent_id
                )));
            }
        }

        let mut config = AgentConfig::new();
        for (key, value) in self.store.agent_configuration(agent_id).await? {
            let resolved = match key.as_str() {
                "toolkits" => ConfigValue::IntList(parse_toolkit_list(&value)?),
                "constraints" if value.is_empty() => ConfigValue::TextList(Vec::new()),
                _ => ConfigValue::Text(value),
            };
            config.set(key, resolved);
        }

        Ok(ResolvedConfiguration {
            agent_name: agent.name,
            config,
        })
    }
}

/// Decodes a brace-delimited comma list (`"{1,2,3}"`) into toolkit ids. An
/// empty value or a stray `[]` marker means no toolkits.
fn parse_toolkit_list(raw: &str) -> Result<Vec<i64>> {
    let inner = raw.trim().trim_start_matches('{').trim_end_matches('}');
    let mut ids = Vec::new();
    for item in inner.split(',') {
        let item = item.trim();
        if item.is_empty() || item == "[]" {
            continue;
        }
        ids.push(
            item.parse()
                .with_context(|| format!("invalid toolkit id {item:?}"))?,
        );
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use crate::types::Agent;

    fn store_with_agent(is_deleted: bool) -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store.add_agent(Agent {
            id: 42,
            name: "researcher".to_string(),
            description: "digs things up".to_string(),
            project_id: 1,
            agent_workflow_id: 7,
            is_deleted,
        });
        store
    }

    #[test]
    fn test_toolkit_list_parsing() {
        assert_eq!(parse_toolkit_list("{1,2,3}").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_toolkit_list("{}").unwrap(), Vec::<i64>::new());
        assert_eq!(parse_toolkit_list("").unwrap(), Vec::<i64>::new());
        assert_eq!(parse_toolkit_list("{[]}").unwrap(), Vec::<i64>::new());
        assert_eq!(parse_toolkit_list("{ 4 , 5 }").unwrap(), vec![4, 5]);
        assert!(parse_toolkit_list("{1,garbage}").is_err());
    }

    #[tokio::test]
    async fn test_resolve_special_cases_and_passthrough() {
        let store = store_with_agent(false);
        store.add_agent_config(42, "goal", "[\"find the answer\"]");
        store.add_agent_config(42, "toolkits", "{1,2,3}");
        store.add_agent_config(42, "constraints", "");
        store.add_agent_config(42, "max_iterations", "25");

        let resolver = ConfigurationResolver::new(store);
        let resolved = resolver.resolve(42).await.unwrap();

        assert_eq!(resolved.agent_name, "researcher");
        assert_eq!(
            resolved.config.get("toolkits"),
            Some(&ConfigValue::IntList(vec![1, 2, 3]))
        );
        assert_eq!(
            resolved.config.get("constraints"),
            Some(&ConfigValue::TextList(Vec::new()))
        );
        assert_eq!(
            resolved.config.get("max_iterations"),
            Some(&ConfigValue::Text("25".to_string()))
        );
    }

    #[tokio::test]
    async fn test_resolve_missing_agent() {
        let store = Arc::new(InMemoryStore::new());
        let resolver = ConfigurationResolver::new(store);
        assert!(matches!(
            resolver.resolve(99).await,
            Err(Error::AgentNotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_resolve_deleted_agent() {
        let store = store_with_agent(true);
        let resolver = ConfigurationResolver::new(store);
        assert!(matches!(
            resolver.resolve(42).await,
            Err(Error::AgentNotFound(42))
        ));
    }
}
