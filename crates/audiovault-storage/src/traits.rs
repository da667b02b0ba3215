//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use audiovault_core::AppError;
use bytes::Bytes;
use thiserror::Error;

use crate::StorageBackend;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::UploadFailed(msg) => AppError::Storage(msg),
            StorageError::DownloadFailed(msg) => AppError::Storage(msg),
            StorageError::DeleteFailed(msg) => AppError::Storage(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::BackendError(msg) => AppError::Storage(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        }
    }
}

/// Durable object storage.
///
/// One instance is built at startup and shared as `Arc<dyn Storage>` by the HTTP handlers
/// and the background materializer.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store bytes under `key` and return the public locator.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<String>;

    /// Store the contents of a local file under `key` and return the public locator.
    async fn put_file(&self, key: &str, path: &Path, content_type: &str)
        -> StorageResult<String>;

    /// Read an object back.
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Time-limited GET URL for direct playback.
    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Delete an object. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    async fn exists(&self, key: &str) -> StorageResult<bool>;

    fn backend_type(&self) -> StorageBackend;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_maps_into_app_error() {
        assert!(matches!(
            AppError::from(StorageError::NotFound("k".to_string())),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(StorageError::UploadFailed("timeout".to_string())),
            AppError::Storage(_)
        ));
        assert!(matches!(
            AppError::from(StorageError::ConfigError("bucket".to_string())),
            AppError::Internal(_)
        ));
    }
}
