use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AgentId, ExecutionId, ExecutionStatus, Resource, StepId};

/// One run of one agent. Created by the launcher with zeroed counters; from
/// then on the execution backend is the writer and this toolkit only
/// re-reads the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionHandle {
    pub id: ExecutionId,
    pub agent_id: AgentId,
    pub name: String,
    pub status: ExecutionStatus,
    pub created_at: DateTime<Utc>,
    pub last_execution_time: DateTime<Utc>,
    pub num_of_calls: i64,
    pub num_of_tokens: i64,
    pub current_step_id: StepId,
    pub iteration_workflow_step_id: StepId,
}

impl ExecutionHandle {
    /// A fresh RUNNING handle, not yet persisted (`id` is assigned by the
    /// store on insert).
    pub fn new(
        agent_id: AgentId,
        name: String,
        current_step_id: StepId,
        iteration_workflow_step_id: StepId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            agent_id,
            name,
            status: ExecutionStatus::Running,
            created_at: now,
            last_execution_time: now,
            num_of_calls: 0,
            num_of_tokens: 0,
            current_step_id,
            iteration_workflow_step_id,
        }
    }
}

/// A resolved configuration value. Most keys stay opaque text; `toolkits`
/// and `constraints` get structured forms during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Text(String),
    TextList(Vec<String>),
    IntList(Vec<i64>),
}

/// Flat key/value parameter set a new execution starts with. Immutable once
/// resolved; produced fresh per launch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    values: BTreeMap<String, ConfigValue>,
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Stored feed row, exactly as the execution backend wrote it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedRow {
    pub id: i64,
    pub agent_execution_id: ExecutionId,
    pub role: String,
    pub feed: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Display form of a feed row. Role/content extraction beyond this lift is
/// the host feed parser's job; the assembler only filters and orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: i64,
    pub role: String,
    pub feed: String,
    pub updated_at: DateTime<Utc>,
}

impl From<&FeedRow> for FeedEntry {
    fn from(row: &FeedRow) -> Self {
        Self {
            id: row.id,
            role: row.role.clone(),
            feed: row.feed.clone(),
            updated_at: row.updated_at,
        }
    }
}

/// Stored human-approval request tied to an execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionRequest {
    pub id: i64,
    pub agent_execution_id: ExecutionId,
    pub tool_name: String,
    pub question: String,
    pub status: String,
    pub user_feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Display form of a permission request. `time_difference` is computed at
/// read time, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionView {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub response: Option<String>,
    pub status: String,
    pub tool_name: String,
    pub question: String,
    pub user_feedback: Option<String>,
    pub time_difference: TimeDifference,
}

impl PermissionView {
    pub fn from_request(request: &PermissionRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: request.id,
            created_at: request.created_at,
            response: request.user_feedback.clone(),
            status: request.status.clone(),
            tool_name: request.tool_name.clone(),
            question: request.question.clone(),
            user_feedback: request.user_feedback.clone(),
            time_difference: TimeDifference::between(request.created_at, now),
        }
    }
}

/// Elapsed wall-clock time broken into calendar-ish units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeDifference {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeDifference {
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        let total = (to - from).num_seconds().max(0);
        let days = total / 86_400;
        Self {
            years: days / 365,
            months: days % 365 / 30,
            days: days % 365 % 30,
            hours: total % 86_400 / 3_600,
            minutes: total % 3_600 / 60,
            seconds: total % 60,
        }
    }
}

/// Assembled feed for one execution: latest status plus the filtered,
/// creation-ordered feed and permission lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionFeed {
    pub status: ExecutionStatus,
    pub feed: Vec<FeedEntry>,
    pub permissions: Vec<PermissionView>,
}

/// What the invoking caller gets back. Everything after `new_execution_id`
/// is populated only on a synchronous wait, and only as far as the stages
/// actually got.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEnvelope {
    pub target_agent_id: AgentId,
    pub new_execution_id: Option<ExecutionId>,
    pub execution: Option<ExecutionHandle>,
    pub feed: Option<ExecutionFeed>,
    pub resources: Option<Vec<Resource>>,
}

impl ResultEnvelope {
    /// The pre-launch shape: only the target id is known.
    pub fn pending(target_agent_id: AgentId) -> Self {
        Self {
            target_agent_id,
            new_execution_id: None,
            execution: None,
            feed: None,
            resources: None,
        }
    }
}
