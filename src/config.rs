use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::waiter::WaitPolicy;
use crate::types::StorageKind;

/// Host-supplied environment configuration. The `{agent_id}` and
/// `{agent_execution_id}` placeholders in `root_input_dir` are substituted
/// per upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage_type: StorageKind,
    pub root_input_dir: String,
    pub bucket_name: Option<String>,
    pub bucket_endpoint: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub wait_poll_interval_secs: u64,
    pub wait_budget_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            storage_type: std::env::var("STORAGE_TYPE")
                .ok()
                .and_then(|v| StorageKind::parse(&v))
                .unwrap_or(defaults.storage_type),
            root_input_dir: std::env::var("RESOURCES_INPUT_ROOT_DIR")
                .unwrap_or(defaults.root_input_dir),
            bucket_name: std::env::var("BUCKET_NAME").ok(),
            bucket_endpoint: std::env::var("BUCKET_ENDPOINT").ok(),
            aws_access_key_id: std::env::var("AWS_ACCESS_KEY_ID").ok(),
            aws_secret_access_key: std::env::var("AWS_SECRET_ACCESS_KEY").ok(),
            wait_poll_interval_secs: std::env::var("WAIT_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.wait_poll_interval_secs),
            wait_budget_secs: std::env::var("WAIT_BUDGET_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.wait_budget_secs),
        }
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            interval: Duration::from_secs(self.wait_poll_interval_secs),
            budget: Duration::from_secs(self.wait_budget_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_type: StorageKind::File,
            root_input_dir: "workspace/input/{agent_id}/{agent_execution_id}".to_string(),
            bucket_name: None,
            bucket_endpoint: None,
            aws_access_key_id: None,
            aws_secret_access_key: None,
            wait_poll_interval_secs: 1,
            wait_budget_secs: 600,
        }
    }
}
