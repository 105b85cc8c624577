use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::storage::Store;
use crate::types::ExecutionHandle;

/// Bounded-wait parameters. The defaults match the host's tool contract:
/// poll once a second for at most ten minutes.
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub budget: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            budget: Duration::from_secs(600),
        }
    }
}

/// What a wait ended with. `timed_out` is a normal outcome, not a failure:
/// the execution keeps running in the backend and the caller can poll the id
/// later. Inspect `execution.status` to know whether the run truly finished.
#[derive(Debug, Clone)]
pub struct WaitOutcome {
    pub execution: ExecutionHandle,
    pub timed_out: bool,
}

/// Polls an execution handle until it leaves the pending set or the budget
/// runs out. The execution backend is the writer of status, so every
/// iteration re-reads the row instead of trusting the held copy.
pub struct ExecutionWaiter {
    store: Arc<dyn Store>,
    policy: WaitPolicy,
}

impl ExecutionWaiter {
    pub fn new(store: Arc<dyn Store>, policy: WaitPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn wait(&self, mut execution: ExecutionHandle) -> Result<WaitOutcome> {
        let mut elapsed = Duration::ZERO;
        while elapsed < self.policy.budget && execution.status.is_pending() {
            // The toolkit's single suspension point.
            tokio::time::sleep(self.policy.interval).await;
            elapsed += self.policy.interval;
            self.store.refresh_execution(&mut execution).await?;
        }

        let timed_out = execution.status.is_pending();
        Ok(WaitOutcome {
            execution,
            timed_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use crate::types::{ExecutionStatus, NO_ITERATION_STEP};

    async fn running_execution(store: &InMemoryStore) -> ExecutionHandle {
        let mut execution =
            ExecutionHandle::new(42, "run".to_string(), 70, NO_ITERATION_STEP);
        execution.id = store.create_execution(&execution).await.unwrap();
        execution
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_exhausts_budget_without_exceeding_it() {
        let store = Arc::new(InMemoryStore::new());
        let execution = running_execution(&store).await;
        let waiter = ExecutionWaiter::new(store, WaitPolicy::default());

        let started = tokio::time::Instant::now();
        let outcome = waiter.wait(execution).await.unwrap();

        // 600 iterations of the 1 s interval, and not one more.
        assert_eq!(started.elapsed(), Duration::from_secs(600));
        assert!(outcome.timed_out);
        assert_eq!(outcome.execution.status, ExecutionStatus::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_when_execution_completes() {
        let store = Arc::new(InMemoryStore::new());
        let execution = running_execution(&store).await;
        let execution_id = execution.id;
        let waiter = ExecutionWaiter::new(store.clone(), WaitPolicy::default());

        let writer = store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            writer.set_execution_status(execution_id, ExecutionStatus::Completed);
        });

        let started = tokio::time::Instant::now();
        let outcome = waiter.wait(execution).await.unwrap();

        assert!(started.elapsed() <= Duration::from_secs(4));
        assert!(!outcome.timed_out);
        assert_eq!(outcome.execution.status, ExecutionStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_exits_immediately_on_terminal_handle() {
        let store = Arc::new(InMemoryStore::new());
        let execution = running_execution(&store).await;
        store.set_execution_status(execution.id, ExecutionStatus::Failed);
        let mut refreshed = execution;
        store.refresh_execution(&mut refreshed).await.unwrap();

        let waiter = ExecutionWaiter::new(store, WaitPolicy::default());
        let started = tokio::time::Instant::now();
        let outcome = waiter.wait(refreshed).await.unwrap();

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(!outcome.timed_out);
        assert_eq!(outcome.execution.status, ExecutionStatus::Failed);
    }
}
