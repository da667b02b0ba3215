//! In-memory doubles for exercising the upload pipeline without Postgres or S3.

use async_trait::async_trait;
use audiovault_core::models::{
    AudioCategory, NewUploadRecord, StoredLocation, UploadRecord, UploadStatus,
};
use audiovault_core::{AppError, StorageBackend};
use audiovault_db::{plan_transition, UploadRecordStore};
use audiovault_storage::{Storage, StorageError, StorageResult};
use bytes::Bytes;
use chrono::Utc;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<UploadRecord>>,
    pub fail_inserts: AtomicBool,
    pub fail_updates: AtomicBool,
    pub update_attempts: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn all(&self) -> Vec<UploadRecord> {
        self.records.lock().unwrap().clone()
    }

    fn find(&self, predicate: impl Fn(&UploadRecord) -> bool) -> Option<UploadRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.upload_status == UploadStatus::Completed)
            .find(|r| predicate(r))
            .cloned()
    }
}

#[async_trait]
impl UploadRecordStore for MemoryRecordStore {
    async fn insert(&self, record: NewUploadRecord) -> Result<UploadRecord, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Internal("connection reset".to_string()));
        }
        let created = UploadRecord {
            file_id: Uuid::new_v4(),
            user_id: record.user_id,
            description: record.description,
            category: record.category,
            file_path: String::new(),
            storage_key: None,
            upload_timestamp: Utc::now(),
            processed_data: None,
            ai_processing_types: None,
            checksum: Some(record.checksum),
            upload_status: UploadStatus::Processing,
        };
        self.records.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn find_completed_by_user_and_digest(
        &self,
        user_id: Uuid,
        digest: &str,
    ) -> Result<Option<UploadRecord>, AppError> {
        Ok(self.find(|r| r.user_id == user_id && r.checksum.as_deref() == Some(digest)))
    }

    async fn find_completed_by_user_and_description(
        &self,
        user_id: Uuid,
        description: &str,
    ) -> Result<Option<UploadRecord>, AppError> {
        Ok(self.find(|r| r.user_id == user_id && r.description == description))
    }

    async fn update_status_and_location(
        &self,
        file_id: Uuid,
        status: UploadStatus,
        location: Option<StoredLocation>,
    ) -> Result<UploadRecord, AppError> {
        self.update_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("connection reset".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.file_id == file_id)
            .ok_or_else(|| AppError::NotFound("Upload record not found".to_string()))?;
        let (file_path, storage_key) = plan_transition(record.upload_status, status, location)?;
        record.upload_status = status;
        record.file_path = file_path;
        record.storage_key = storage_key;
        Ok(record.clone())
    }

    async fn get(&self, file_id: Uuid) -> Result<Option<UploadRecord>, AppError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.file_id == file_id)
            .cloned())
    }
}

/// Storage whose writes always fail.
pub struct FailingStorage;

#[async_trait]
impl Storage for FailingStorage {
    async fn put(&self, _key: &str, _data: Bytes, _content_type: &str) -> StorageResult<String> {
        Err(StorageError::UploadFailed("bucket unreachable".to_string()))
    }

    async fn put_file(&self, _key: &str, _path: &Path, _content_type: &str) -> StorageResult<String> {
        Err(StorageError::UploadFailed("bucket unreachable".to_string()))
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        Err(StorageError::NotFound(key.to_string()))
    }

    async fn presigned_get_url(&self, key: &str, _expires_in: Duration) -> StorageResult<String> {
        Err(StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, _key: &str) -> StorageResult<()> {
        Ok(())
    }

    async fn exists(&self, _key: &str) -> StorageResult<bool> {
        Ok(false)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

pub async fn insert_processing(
    store: &MemoryRecordStore,
    description: &str,
    checksum: &str,
) -> UploadRecord {
    store
        .insert(NewUploadRecord {
            user_id: Uuid::new_v4(),
            description: description.to_string(),
            category: AudioCategory::Music,
            checksum: checksum.to_string(),
        })
        .await
        .unwrap()
}

/// Poll until the record reaches a terminal state, panicking after a few seconds.
pub async fn wait_for_terminal(store: &MemoryRecordStore, file_id: Uuid) -> UploadRecord {
    for _ in 0..200 {
        if let Some(record) = store.get(file_id).await.unwrap() {
            if record.upload_status.is_terminal() {
                return record;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("upload {} never left processing", file_id);
}
