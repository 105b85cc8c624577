use std::sync::Arc;

use chrono::Utc;
use regex::Regex;

use crate::error::{Error, Result};
use crate::storage::Store;
use crate::types::{ExecutionFeed, ExecutionId, FeedEntry, PermissionView};

/// Boilerplate the host's prompt construction injects into every feed; it
/// must never reach a user-facing timeline.
const CURRENT_TIME_PATTERN: &str =
    r"The current time and date is\s(\w{3}\s\w{3}\s\s?\d{1,2}\s\d{2}:\d{2}:\d{2}\s\d{4})";

/// Collects an execution's timeline and pending permission requests into a
/// display-ready structure: creation order, noise filtered, permission
/// elapsed times computed fresh at read time.
pub struct FeedAssembler {
    store: Arc<dyn Store>,
    current_time: Regex,
}

impl FeedAssembler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            current_time: Regex::new(CURRENT_TIME_PATTERN).unwrap(),
        }
    }

    pub async fn assemble(&self, execution_id: ExecutionId) -> Result<ExecutionFeed> {
        let execution = self
            .store
            .get_execution(execution_id)
            .await?
            .ok_or(Error::ExecutionNotFound(execution_id))?;

        let feed = self
            .store
            .execution_feed(execution_id)
            .await?
            .iter()
            .filter(|row| !row.feed.is_empty() && !self.current_time.is_match(&row.feed))
            .map(FeedEntry::from)
            .collect();

        let now = Utc::now();
        let permissions = self
            .store
            .execution_permissions(execution_id)
            .await?
            .iter()
            .map(|request| PermissionView::from_request(request, now))
            .collect();

        Ok(ExecutionFeed {
            status: execution.status,
            feed,
            permissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use crate::types::{ExecutionHandle, FeedRow, PermissionRequest, NO_ITERATION_STEP};
    use chrono::Duration;

    fn feed_row(id: i64, execution_id: ExecutionId, text: &str) -> FeedRow {
        let at = Utc::now() + Duration::seconds(id);
        FeedRow {
            id,
            agent_execution_id: execution_id,
            role: "assistant".to_string(),
            feed: text.to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_assemble_filters_synthetic_and_empty_entries() {
        let store = Arc::new(InMemoryStore::new());
        let execution = ExecutionHandle::new(42, "run".to_string(), 70, NO_ITERATION_STEP);
        let execution_id = store.create_execution(&execution).await.unwrap();

        store.add_feed_row(feed_row(1, execution_id, "Thinking about the goal"));
        store.add_feed_row(feed_row(
            2,
            execution_id,
            "The current time and date is Mon Jul  3 08:01:12 2023",
        ));
        store.add_feed_row(feed_row(3, execution_id, "Calling the search tool"));
        store.add_feed_row(feed_row(4, execution_id, ""));
        store.add_feed_row(feed_row(5, execution_id, "Done"));

        let assembler = FeedAssembler::new(store);
        let assembled = assembler.assemble(execution_id).await.unwrap();

        let texts: Vec<&str> = assembled.feed.iter().map(|e| e.feed.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Thinking about the goal", "Calling the search tool", "Done"]
        );
    }

    #[tokio::test]
    async fn test_assemble_orders_and_times_permissions() {
        let store = Arc::new(InMemoryStore::new());
        let execution = ExecutionHandle::new(42, "run".to_string(), 70, NO_ITERATION_STEP);
        let execution_id = store.create_execution(&execution).await.unwrap();

        let older = Utc::now() - Duration::minutes(5);
        let newer = Utc::now() - Duration::seconds(10);
        store.add_permission(PermissionRequest {
            id: 2,
            agent_execution_id: execution_id,
            tool_name: "write_file".to_string(),
            question: "Overwrite report.txt?".to_string(),
            status: "PENDING".to_string(),
            user_feedback: None,
            created_at: newer,
        });
        store.add_permission(PermissionRequest {
            id: 1,
            agent_execution_id: execution_id,
            tool_name: "execute_code".to_string(),
            question: "Run the script?".to_string(),
            status: "APPROVED".to_string(),
            user_feedback: Some("go ahead".to_string()),
            created_at: older,
        });

        let assembler = FeedAssembler::new(store);
        let assembled = assembler.assemble(execution_id).await.unwrap();

        assert_eq!(assembled.permissions.len(), 2);
        assert_eq!(assembled.permissions[0].id, 1);
        assert_eq!(assembled.permissions[1].id, 2);
        assert_eq!(assembled.permissions[0].time_difference.minutes, 5);
        assert_eq!(
            assembled.permissions[0].response.as_deref(),
            Some("go ahead")
        );
    }

    #[tokio::test]
    async fn test_assemble_unknown_execution() {
        let store = Arc::new(InMemoryStore::new());
        let assembler = FeedAssembler::new(store);
        assert!(matches!(
            assembler.assemble(77).await,
            Err(Error::ExecutionNotFound(77))
        ));
    }
}
