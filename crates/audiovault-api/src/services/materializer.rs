//! Background materializer: moves ingested scratch files into durable storage and
//! finalizes their upload records.

use audiovault_core::models::{StoredLocation, UploadStatus};
use audiovault_core::{AppError, Config};
use audiovault_db::UploadRecordStore;
use audiovault_storage::{generate_audio_key, Storage};
use std::sync::Arc;
use tempfile::TempPath;
use tokio::sync::{mpsc, Semaphore};
use uuid::Uuid;

/// One accepted upload waiting to be moved into durable storage.
///
/// The job owns the scratch file and removes it after the store attempt, whatever the outcome.
#[derive(Debug)]
pub struct MaterializeJob {
    pub file_id: Uuid,
    pub user_id: Uuid,
    /// Sanitized original filename, used in the storage key
    pub filename: String,
    pub content_type: String,
    pub scratch: TempPath,
}

#[derive(Debug, Clone, Copy)]
pub struct MaterializerConfig {
    pub max_concurrent: usize,
    pub queue_size: usize,
}

impl MaterializerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrent: config.materializer_max_concurrent(),
            queue_size: config.materializer_queue_size(),
        }
    }
}

/// A reserved slot in the queue. Sending through it cannot fail.
pub struct MaterializerPermit {
    permit: mpsc::OwnedPermit<MaterializeJob>,
}

impl MaterializerPermit {
    pub fn send(self, job: MaterializeJob) {
        tracing::info!(
            upload_id = %job.file_id,
            user_id = %job.user_id,
            "Enqueuing materialization job"
        );
        self.permit.send(job);
    }
}

struct MaterializerContext {
    store: Arc<dyn UploadRecordStore>,
    storage: Arc<dyn Storage>,
}

#[derive(Clone)]
pub struct MaterializerQueue {
    tx: mpsc::Sender<MaterializeJob>,
}

impl MaterializerQueue {
    /// Create the queue and spawn its worker pool.
    ///
    /// At most `max_concurrent` jobs run at once; up to `queue_size` more may wait.
    pub fn new(
        store: Arc<dyn UploadRecordStore>,
        storage: Arc<dyn Storage>,
        config: MaterializerConfig,
    ) -> Self {
        let queue_size = config.queue_size.max(1);
        let max_concurrent = config.max_concurrent.max(1);
        let (tx, rx) = mpsc::channel(queue_size);

        let ctx = Arc::new(MaterializerContext { store, storage });
        tokio::spawn(async move {
            Self::worker_pool(rx, ctx, max_concurrent).await;
        });

        tracing::info!(
            queue_size = queue_size,
            max_concurrent = max_concurrent,
            "Materializer queue initialized with bounded channel"
        );

        Self { tx }
    }

    /// Reserve room for one job without waiting.
    ///
    /// Callers reserve before creating the record so a full queue never leaves a record
    /// that nothing will finalize.
    pub fn reserve(&self) -> Result<MaterializerPermit, AppError> {
        self.tx
            .clone()
            .try_reserve_owned()
            .map(|permit| MaterializerPermit { permit })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    tracing::warn!("Materializer queue is full, rejecting upload");
                    AppError::ServiceUnavailable(
                        "Upload queue is full, please try again later".to_string(),
                    )
                }
                mpsc::error::TrySendError::Closed(_) => {
                    AppError::Internal("Materializer queue is closed".to_string())
                }
            })
    }

    async fn worker_pool(
        mut rx: mpsc::Receiver<MaterializeJob>,
        ctx: Arc<MaterializerContext>,
        max_concurrent: usize,
    ) {
        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        while let Some(job) = rx.recv().await {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let ctx = ctx.clone();

            tokio::spawn(async move {
                let _permit = permit;
                Self::materialize(job, ctx).await;
            });
        }

        tracing::info!("Materializer queue closed, worker pool exiting");
    }

    #[tracing::instrument(
        skip(job, ctx),
        fields(
            upload_id = %job.file_id,
            user_id = %job.user_id,
            storage_key = tracing::field::Empty,
            job.status = tracing::field::Empty
        )
    )]
    async fn materialize(job: MaterializeJob, ctx: Arc<MaterializerContext>) {
        let start = std::time::Instant::now();
        let MaterializeJob {
            file_id,
            user_id,
            filename,
            content_type,
            scratch,
        } = job;

        let key = generate_audio_key(user_id, &filename);
        tracing::Span::current().record("storage_key", key.as_str());

        let result = ctx.storage.put_file(&key, &scratch, &content_type).await;
        let elapsed = start.elapsed();

        // The scratch copy is no longer needed once the store attempt has finished.
        let path_display = scratch.display().to_string();
        if let Err(e) = scratch.close() {
            tracing::warn!(path = %path_display, error = %e, "Failed to remove scratch file");
        }

        let (status, location) = match result {
            Ok(url) => {
                tracing::Span::current().record("job.status", "success");
                tracing::info!(
                    upload_id = %file_id,
                    duration_ms = elapsed.as_millis(),
                    "Upload materialized"
                );
                (
                    UploadStatus::Completed,
                    Some(StoredLocation {
                        url,
                        storage_key: key.clone(),
                    }),
                )
            }
            Err(e) => {
                tracing::Span::current().record("job.status", "failed");
                tracing::error!(
                    upload_id = %file_id,
                    user_id = %user_id,
                    storage_key = %key,
                    error = %e,
                    duration_ms = elapsed.as_millis(),
                    "Upload materialization failed"
                );
                (UploadStatus::Error, None)
            }
        };

        if let Err(update_err) = ctx
            .store
            .update_status_and_location(file_id, status, location)
            .await
        {
            tracing::error!(
                upload_id = %file_id,
                status = %status,
                error = %update_err,
                "Failed to record materialization outcome"
            );
            // The record will never point at the object, so do not leave it behind.
            if status == UploadStatus::Completed {
                if let Err(e) = ctx.storage.delete(&key).await {
                    tracing::warn!(storage_key = %key, error = %e, "Failed to remove orphaned object");
                }
            }
        }
    }
}
