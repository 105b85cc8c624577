mod common;

use std::sync::Arc;

use serde_json::json;

use marionette::backend::{NullExecutionBackend, NullSummarizer};
use marionette::resources::MemoryBlobStore;
use marionette::tools::{AgentRegistry, ToolContext, ToolRuntime};
use marionette::{Config, CrossAgentInvoker};

use common::{seeded_store, TARGET_AGENT_ID, TOOLKIT_ID};

fn context() -> ToolContext {
    ToolContext {
        agent_id: TARGET_AGENT_ID,
        execution_id: None,
        toolkit_id: TOOLKIT_ID,
    }
}

async fn runtime(store: Arc<marionette::storage::InMemoryStore>) -> ToolRuntime {
    let invoker = Arc::new(CrossAgentInvoker::new(
        store.clone(),
        Arc::new(NullExecutionBackend),
        Arc::new(MemoryBlobStore::new()),
        Arc::new(NullSummarizer),
        Config::default(),
    ));
    let snapshot = AgentRegistry::new(store.clone())
        .refresh(TOOLKIT_ID)
        .await
        .unwrap();
    ToolRuntime::new(store, invoker, &snapshot)
}

#[tokio::test]
async fn test_list_agents_scoped_to_default_project() {
    let store = seeded_store();
    let runtime = runtime(store).await;

    let output = runtime
        .execute("list_agents", json!({}), &context())
        .await
        .unwrap();

    assert_eq!(output["organisation"]["name"], "acme");
    assert_eq!(output["project"]["id"], 10);
    let agents = output["agents"].as_array().unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0]["id"], TARGET_AGENT_ID);
}

#[tokio::test]
async fn test_current_agent_snapshot() {
    let store = seeded_store();
    let runtime = runtime(store).await;

    let output = runtime
        .execute("current_agent", json!({}), &context())
        .await
        .unwrap();

    assert_eq!(output["id"], TARGET_AGENT_ID);
    assert_eq!(output["name"], "researcher");
    assert_eq!(output["is_deleted"], false);
}

#[tokio::test]
async fn test_run_agent_without_wait() {
    let store = seeded_store();
    let runtime = runtime(store).await;

    let output = runtime
        .execute(
            "run_agent",
            json!({"target_agent_id": TARGET_AGENT_ID, "wait_for_result": false}),
            &context(),
        )
        .await
        .unwrap();

    assert_eq!(output["target_agent_id"], TARGET_AGENT_ID);
    assert!(output["new_execution_id"].is_i64());
    assert!(output["execution"].is_null());
}

#[tokio::test]
async fn test_run_agent_requires_target() {
    let store = seeded_store();
    let runtime = runtime(store).await;

    let result = runtime
        .execute("run_agent", json!({"wait_for_result": true}), &context())
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_list_resources_empty_before_any_upload() {
    let store = seeded_store();
    let runtime = runtime(store).await;

    let output = runtime
        .execute("list_resources", json!({}), &context())
        .await
        .unwrap();

    assert_eq!(output.as_array().unwrap().len(), 0);
}
