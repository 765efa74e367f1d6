//! Storage abstraction trait
//!
//! Backends are write-once per key for submission assets; the orchestrator
//! derives a fresh key prefix per submission, so a put never overwrites a
//! prior submission's blob.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Callback receiving the cumulative bytes transferred for one put.
pub type ProgressFn = Arc<dyn Fn(u64) + Send + Sync>;

/// Storage abstraction trait
///
/// Backends store a blob under a caller-supplied key and return a resolvable
/// download URL. Transfers report cumulative byte counts through the
/// optional progress callback so callers can aggregate progress across
/// several sequential puts.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a blob and return its download URL.
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        data: Bytes,
        progress: Option<ProgressFn>,
    ) -> StorageResult<String>;

    /// Delete a blob by key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check whether a blob exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;
}
