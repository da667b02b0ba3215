//! Upload orchestration
//!
//! The synchronous half of an upload:
//! 1. Check the declared content type against the allow-list (before any I/O)
//! 2. Stream the body to scratch storage, hashing it and enforcing the size cap
//! 3. Reject duplicates among the user's completed uploads
//! 4. Reserve a materializer slot, create the `processing` record, hand the file off
//!
//! The caller gets the `processing` record back immediately; the materializer finishes
//! the record later.

use super::dedup::ensure_not_duplicate;
use super::ingest::ingest;
use super::types::{IngestedFile, UploadLimits, UploadRequest};
use crate::services::materializer::{MaterializeJob, MaterializerQueue};
use crate::utils::upload::validate_content_type;
use audiovault_core::models::{NewUploadRecord, UploadRecord};
use audiovault_core::AppError;
use audiovault_db::UploadRecordStore;
use std::sync::Arc;
use tokio::io::AsyncRead;

#[derive(Clone)]
pub struct UploadService {
    store: Arc<dyn UploadRecordStore>,
    queue: MaterializerQueue,
    limits: UploadLimits,
}

impl UploadService {
    pub fn new(
        store: Arc<dyn UploadRecordStore>,
        queue: MaterializerQueue,
        limits: UploadLimits,
    ) -> Self {
        Self {
            store,
            queue,
            limits,
        }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Validate the content type, then stream `reader` into scratch storage.
    pub async fn receive<R>(
        &self,
        content_type: &str,
        filename: &str,
        reader: R,
    ) -> Result<IngestedFile, AppError>
    where
        R: AsyncRead + Unpin,
    {
        validate_content_type(content_type, &self.limits.allowed_content_types)?;

        ingest(
            reader,
            &self.limits.scratch_dir,
            filename,
            self.limits.max_size_bytes,
            self.limits.chunk_size_bytes,
        )
        .await
    }

    /// Dedup-check an ingested file, record it as `processing` and schedule materialization.
    ///
    /// On any error the scratch file is removed and no record is left behind.
    #[tracing::instrument(
        skip(self, request),
        fields(user_id = %request.user_id, upload.bytes = request.file.size, upload_id = tracing::field::Empty)
    )]
    pub async fn submit(&self, request: UploadRequest) -> Result<UploadRecord, AppError> {
        let UploadRequest {
            user_id,
            description,
            category,
            filename,
            content_type,
            file,
        } = request;

        if let Err(e) =
            ensure_not_duplicate(self.store.as_ref(), user_id, &file.digest, &description).await
        {
            file.discard();
            return Err(e);
        }

        let permit = match self.queue.reserve() {
            Ok(permit) => permit,
            Err(e) => {
                file.discard();
                return Err(e);
            }
        };

        let record = match self
            .store
            .insert(NewUploadRecord {
                user_id,
                description,
                category,
                checksum: file.digest.clone(),
            })
            .await
        {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create upload record");
                file.discard();
                return Err(AppError::Internal(format!(
                    "Error creating upload record: {}",
                    e
                )));
            }
        };

        tracing::Span::current().record("upload_id", tracing::field::display(record.file_id));

        permit.send(MaterializeJob {
            file_id: record.file_id,
            user_id,
            filename,
            content_type,
            scratch: file.path,
        });

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::materializer::MaterializerConfig;
    use crate::services::test_support::{wait_for_terminal, FailingStorage, MemoryRecordStore};
    use audiovault_core::constants::SIZE_LIMIT_MESSAGE;
    use audiovault_core::models::{AudioCategory, UploadStatus};
    use audiovault_storage::{LocalStorage, Storage};
    use std::path::Path;
    use std::sync::atomic::Ordering;
    use tempfile::{tempdir, TempDir};
    use uuid::Uuid;

    struct Harness {
        service: UploadService,
        store: Arc<MemoryRecordStore>,
        scratch: TempDir,
        _storage_dir: TempDir,
    }

    async fn harness(failing_storage: bool) -> Harness {
        let scratch = tempdir().unwrap();
        let storage_dir = tempdir().unwrap();
        let store = Arc::new(MemoryRecordStore::default());
        let storage: Arc<dyn Storage> = if failing_storage {
            Arc::new(FailingStorage)
        } else {
            Arc::new(
                LocalStorage::new(storage_dir.path(), "http://localhost/media".to_string())
                    .await
                    .unwrap(),
            )
        };
        let queue = MaterializerQueue::new(
            store.clone(),
            storage,
            MaterializerConfig {
                max_concurrent: 2,
                queue_size: 8,
            },
        );
        let mut limits = UploadLimits::with_scratch_dir(scratch.path());
        limits.max_size_bytes = 1024;
        limits.chunk_size_bytes = 64;

        Harness {
            service: UploadService::new(store.clone(), queue, limits),
            store,
            scratch,
            _storage_dir: storage_dir,
        }
    }

    fn scratch_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    async fn upload(
        service: &UploadService,
        user_id: Uuid,
        description: &str,
        bytes: &[u8],
    ) -> Result<UploadRecord, AppError> {
        let file = service.receive("audio/mpeg", "track.mp3", bytes).await?;
        service
            .submit(UploadRequest {
                user_id,
                description: description.to_string(),
                category: AudioCategory::Music,
                filename: "track.mp3".to_string(),
                content_type: "audio/mpeg".to_string(),
                file,
            })
            .await
    }

    #[tokio::test]
    async fn accepted_upload_starts_processing_then_completes() {
        let h = harness(false).await;
        let user = Uuid::new_v4();

        let record = upload(&h.service, user, "Morning Song", b"abc123").await.unwrap();
        assert_eq!(record.upload_status, UploadStatus::Processing);
        assert!(record.file_path.is_empty());
        assert_eq!(record.checksum.as_deref().map(str::len), Some(64));

        let done = wait_for_terminal(&h.store, record.file_id).await;
        assert_eq!(done.upload_status, UploadStatus::Completed);
        assert!(!done.file_path.is_empty());
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn same_bytes_again_are_rejected_as_duplicate_content() {
        let h = harness(false).await;
        let user = Uuid::new_v4();

        let first = upload(&h.service, user, "Morning Song", b"abc123").await.unwrap();
        wait_for_terminal(&h.store, first.file_id).await;

        let err = upload(&h.service, user, "Evening Song", b"abc123")
            .await
            .unwrap_err();
        match err {
            AppError::DuplicateContent {
                file_id,
                description,
            } => {
                assert_eq!(file_id, first.file_id);
                assert_eq!(description, "Morning Song");
            }
            other => panic!("expected DuplicateContent, got {:?}", other),
        }
        assert_eq!(h.store.all().len(), 1);
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn same_description_is_rejected_whatever_the_content() {
        let h = harness(false).await;
        let user = Uuid::new_v4();

        let first = upload(&h.service, user, "X", b"first").await.unwrap();
        wait_for_terminal(&h.store, first.file_id).await;

        let err = upload(&h.service, user, "X", b"second").await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateDescription { ref description } if description == "X"));
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn duplicates_are_scoped_to_the_user() {
        let h = harness(false).await;

        let first = upload(&h.service, Uuid::new_v4(), "Shared", b"same").await.unwrap();
        wait_for_terminal(&h.store, first.file_id).await;

        assert!(upload(&h.service, Uuid::new_v4(), "Shared", b"same").await.is_ok());
    }

    #[tokio::test]
    async fn processing_records_do_not_block_a_second_upload() {
        let h = harness(true).await;
        let user = Uuid::new_v4();

        let first = upload(&h.service, user, "Loop", b"same").await.unwrap();
        let second = upload(&h.service, user, "Loop", b"same").await.unwrap();
        assert_ne!(first.file_id, second.file_id);
    }

    #[tokio::test]
    async fn storage_failure_surfaces_only_through_status() {
        let h = harness(true).await;

        let record = upload(&h.service, Uuid::new_v4(), "Doomed", b"bytes")
            .await
            .unwrap();
        assert_eq!(record.upload_status, UploadStatus::Processing);

        let done = wait_for_terminal(&h.store, record.file_id).await;
        assert_eq!(done.upload_status, UploadStatus::Error);
        assert!(done.file_path.is_empty());
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn concurrent_distinct_uploads_get_distinct_locations() {
        let h = harness(false).await;
        let user = Uuid::new_v4();

        let (a, b) = tokio::join!(
            upload(&h.service, user, "Track A", b"aaaa"),
            upload(&h.service, user, "Track B", b"bbbb"),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.file_id, b.file_id);

        let a = wait_for_terminal(&h.store, a.file_id).await;
        let b = wait_for_terminal(&h.store, b.file_id).await;
        assert_eq!(a.upload_status, UploadStatus::Completed);
        assert_eq!(b.upload_status, UploadStatus::Completed);
        assert_ne!(a.file_path, b.file_path);
    }

    #[tokio::test]
    async fn disallowed_content_type_is_rejected_before_writing() {
        let h = harness(false).await;

        let err = h
            .service
            .receive("video/mp4", "clip.mp4", &b"bytes"[..])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaType { .. }));
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_and_discarded() {
        let h = harness(false).await;
        let payload = vec![1u8; 1025];

        let err = upload(&h.service, Uuid::new_v4(), "Big", &payload)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(ref m) if m == SIZE_LIMIT_MESSAGE));
        assert!(h.store.all().is_empty());
        assert!(scratch_is_empty(h.scratch.path()));
    }

    #[tokio::test]
    async fn insert_failure_is_internal_and_cleans_up() {
        let h = harness(false).await;
        h.store.fail_inserts.store(true, Ordering::SeqCst);

        let err = upload(&h.service, Uuid::new_v4(), "Lost", b"bytes")
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::Internal(ref m) if m.starts_with("Error creating upload record:"))
        );
        assert!(scratch_is_empty(h.scratch.path()));
    }
}
