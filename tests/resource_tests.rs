mod common;

use std::sync::Arc;

use marionette::backend::NullSummarizer;
use marionette::resources::{LocalDiskStore, ResourceManager};
use marionette::types::StorageKind;
use marionette::{Config, Error};

use common::{seeded_store, TARGET_AGENT_ID};

fn disk_manager(
    store: Arc<marionette::storage::InMemoryStore>,
    base: &std::path::Path,
) -> ResourceManager {
    ResourceManager::new(
        TARGET_AGENT_ID,
        store,
        Arc::new(LocalDiskStore::new(base)),
        Arc::new(NullSummarizer),
        &Config::default(),
    )
}

#[tokio::test]
async fn test_disk_backed_upload_and_download() {
    let store = seeded_store();
    let dir = tempfile::tempdir().unwrap();
    let manager = disk_manager(store.clone(), dir.path());

    let resource = manager
        .upload(b"hello from a file", "notes.txt", 17, "text/plain", Some(9))
        .await
        .unwrap();

    assert_eq!(resource.storage_type, StorageKind::File);
    assert_eq!(
        resource.path,
        format!("workspace/input/{TARGET_AGENT_ID}/9/notes.txt")
    );
    assert!(dir.path().join(&resource.path).is_file());

    let bytes = manager.download(resource.id).await.unwrap();
    assert_eq!(bytes, b"hello from a file");
}

#[tokio::test]
async fn test_disk_backed_download_of_removed_file() {
    let store = seeded_store();
    let dir = tempfile::tempdir().unwrap();
    let manager = disk_manager(store.clone(), dir.path());

    let resource = manager
        .upload(b"ephemeral", "scratch.txt", 9, "text/plain", None)
        .await
        .unwrap();
    std::fs::remove_file(dir.path().join(&resource.path)).unwrap();

    assert!(matches!(
        manager.download(resource.id).await,
        Err(Error::FileNotFound(_))
    ));
}

#[tokio::test]
async fn test_agent_level_upload_lands_outside_execution_dirs() {
    let store = seeded_store();
    let dir = tempfile::tempdir().unwrap();
    let manager = disk_manager(store.clone(), dir.path());

    let resource = manager
        .upload(b"shared", "shared.csv", 6, "text/csv", None)
        .await
        .unwrap();

    assert_eq!(
        resource.path,
        format!("workspace/input/{TARGET_AGENT_ID}/shared.csv")
    );
    assert_eq!(resource.agent_execution_id, None);
}
