use audiovault_core::models::UploadStatus;
use audiovault_core::{AppError, Config};
use audiovault_db::{UploadRecordRepository, UploadRecordStore};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

const REAP_BATCH_SIZE: i64 = 100;

/// Fails uploads that have been `processing` for longer than a grace period.
///
/// A materializer job that dies with the process never finalizes its record; this sweep
/// moves such records to `error` through the same guarded transition the materializer uses.
#[derive(Clone)]
pub struct StaleUploadReaper {
    repository: UploadRecordRepository,
    interval: Duration,
    grace_period: chrono::Duration,
}

impl StaleUploadReaper {
    pub fn new(
        repository: UploadRecordRepository,
        interval: Duration,
        grace_period: chrono::Duration,
    ) -> Self {
        Self {
            repository,
            interval,
            grace_period,
        }
    }

    /// Build a reaper from configuration. `None` when the sweep is disabled.
    pub fn from_config(repository: UploadRecordRepository, config: &Config) -> Option<Self> {
        match config.stale_upload_reap_interval_secs() {
            0 => None,
            secs => Some(Self::new(
                repository,
                Duration::from_secs(secs),
                chrono::Duration::seconds(config.stale_upload_grace_period_secs()),
            )),
        }
    }

    /// Start the periodic sweep. Returns a JoinHandle for graceful shutdown.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(self.interval);

            loop {
                sweep_interval.tick().await;

                match self.sweep().await {
                    Ok(0) => tracing::debug!("No stale uploads found"),
                    Ok(reaped) => tracing::info!(reaped, "Marked stale uploads as failed"),
                    Err(e) => tracing::error!(error = %e, "Stale upload sweep failed"),
                }
            }
        })
    }

    /// Run one sweep and return how many records were moved to `error`.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "reap_stale_uploads"))]
    pub async fn sweep(&self) -> Result<usize, AppError> {
        let cutoff = Utc::now() - self.grace_period;
        let stale = self
            .repository
            .find_stale_processing(cutoff, REAP_BATCH_SIZE)
            .await?;

        let mut reaped = 0;
        for record in stale {
            match self
                .repository
                .update_status_and_location(record.file_id, UploadStatus::Error, None)
                .await
            {
                Ok(_) => {
                    tracing::warn!(
                        upload_id = %record.file_id,
                        user_id = %record.user_id,
                        created_at = %record.upload_timestamp,
                        "Upload stuck in processing, marked as error"
                    );
                    reaped += 1;
                }
                // Finalized by the materializer between the scan and the update.
                Err(AppError::InvalidStateTransition { .. }) => {}
                Err(e) => {
                    tracing::error!(upload_id = %record.file_id, error = %e, "Failed to reap stale upload");
                }
            }
        }

        Ok(reaped)
    }
}
