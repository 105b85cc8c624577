use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::Config;
use crate::error::Error;

/// Byte storage addressed by templated path. `get` returns `None` for a
/// missing object; callers decide whether that is an error.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<()>;
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>>;
}

/// Local filesystem backend rooted at a base directory.
pub struct LocalDiskStore {
    base: PathBuf,
}

impl LocalDiskStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

#[async_trait]
impl BlobStore for LocalDiskStore {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let full = self.base.join(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        tokio::fs::write(&full, bytes)
            .await
            .with_context(|| format!("writing {}", full.display()))?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let full = self.base.join(path);
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("reading {}", full.display())),
        }
    }
}

/// S3-compatible bucket backend over plain HTTP. Construction fails with
/// `StorageCredentialsMissing` rather than letting the first upload surface
/// a confusing request error.
pub struct BucketStore {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    access_key_id: String,
    secret_access_key: String,
}

impl BucketStore {
    pub fn from_config(config: &Config) -> std::result::Result<Self, Error> {
        let (access_key_id, secret_access_key) = match (
            config.aws_access_key_id.clone(),
            config.aws_secret_access_key.clone(),
        ) {
            (Some(id), Some(secret)) => (id, secret),
            _ => return Err(Error::StorageCredentialsMissing),
        };
        let (endpoint, bucket) = match (config.bucket_endpoint.clone(), config.bucket_name.clone())
        {
            (Some(endpoint), Some(bucket)) => (endpoint, bucket),
            _ => return Err(Error::StorageCredentialsMissing),
        };

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            bucket,
            access_key_id,
            secret_access_key,
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.bucket,
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl BlobStore for BucketStore {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<()> {
        self.client
            .put(self.object_url(path))
            .basic_auth(&self.access_key_id, Some(&self.secret_access_key))
            .body(bytes.to_vec())
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("uploading {path}"))?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get(self.object_url(path))
            .basic_auth(&self.access_key_id, Some(&self.secret_access_key))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .with_context(|| format!("downloading {path}"))?;
        Ok(Some(response.bytes().await?.to_vec()))
    }
}

/// In-process backend for tests and for hosts that keep artifacts ephemeral.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.read().unwrap().contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().unwrap().is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<()> {
        self.objects
            .write()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.objects.read().unwrap().get(path).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StorageKind;

    #[test]
    fn test_bucket_store_requires_credentials() {
        let config = Config {
            storage_type: StorageKind::S3,
            bucket_name: Some("artifacts".to_string()),
            bucket_endpoint: Some("https://storage.example.com".to_string()),
            aws_access_key_id: None,
            aws_secret_access_key: None,
            ..Config::default()
        };
        assert!(matches!(
            BucketStore::from_config(&config),
            Err(Error::StorageCredentialsMissing)
        ));
    }

    #[test]
    fn test_bucket_store_object_url() {
        let config = Config {
            storage_type: StorageKind::S3,
            bucket_name: Some("artifacts".to_string()),
            bucket_endpoint: Some("https://storage.example.com/".to_string()),
            aws_access_key_id: Some("key".to_string()),
            aws_secret_access_key: Some("secret".to_string()),
            ..Config::default()
        };
        let store = BucketStore::from_config(&config).unwrap();
        assert_eq!(
            store.object_url("resources/workspace/input/42/report.csv"),
            "https://storage.example.com/artifacts/resources/workspace/input/42/report.csv"
        );
    }
}
