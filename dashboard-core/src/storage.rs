use async_trait::async_trait;
use std::fmt::Debug;
use tracing::{info, warn};

use crate::error::StorageError;

pub mod aws;
pub mod memory;

pub use aws::S3Store;
pub use memory::MemoryStore;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_HTML: &str = "text/html";

/// Minimal object storage surface the pipeline needs.
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Name of the bucket every operation targets.
    fn bucket(&self) -> &str;

    async fn bucket_exists(&self) -> Result<bool, StorageError>;

    async fn create_bucket(&self) -> Result<(), StorageError>;

    /// Write `body` under `key`, replacing whatever was there.
    async fn put(&self, key: &str, body: &[u8], content_type: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketStatus {
    Existing,
    Created,
}

/// Best-effort bucket provisioning: check once, create if missing.
///
/// A failed existence check is treated as "missing" and creation is attempted.
pub async fn ensure_bucket(store: &dyn ObjectStore) -> Result<BucketStatus, StorageError> {
    match store.bucket_exists().await {
        Ok(true) => {
            info!(bucket = store.bucket(), "Bucket exists");
            return Ok(BucketStatus::Existing);
        }
        Ok(false) => {}
        Err(err) => warn!(bucket = store.bucket(), error = %err, "Bucket existence check failed"),
    }

    info!(bucket = store.bucket(), "Creating bucket");
    store.create_bucket().await?;
    info!(bucket = store.bucket(), "Successfully created bucket");

    Ok(BucketStatus::Created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn existing_bucket_is_left_alone() {
        let store = MemoryStore::existing("dash");

        let status = ensure_bucket(&store).await.unwrap();

        assert_eq!(status, BucketStatus::Existing);
        assert!(!store.bucket_created());
    }

    #[tokio::test]
    async fn missing_bucket_is_created() {
        let store = MemoryStore::new("dash");

        let status = ensure_bucket(&store).await.unwrap();

        assert_eq!(status, BucketStatus::Created);
        assert!(store.bucket_created());
        assert!(store.bucket_exists().await.unwrap());
    }
}
