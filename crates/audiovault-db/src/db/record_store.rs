use audiovault_core::models::{NewUploadRecord, StoredLocation, UploadRecord, UploadStatus};
use audiovault_core::AppError;
use uuid::Uuid;

/// Persistence operations the upload pipeline depends on.
///
/// Implemented by [`crate::UploadRecordRepository`]; the pipeline only sees this trait so it
/// can be exercised against an in-memory store.
#[async_trait::async_trait]
pub trait UploadRecordStore: Send + Sync {
    /// Persist a new record in `processing` state with an empty location.
    async fn insert(&self, record: NewUploadRecord) -> Result<UploadRecord, AppError>;

    async fn find_completed_by_user_and_digest(
        &self,
        user_id: Uuid,
        digest: &str,
    ) -> Result<Option<UploadRecord>, AppError>;

    async fn find_completed_by_user_and_description(
        &self,
        user_id: Uuid,
        description: &str,
    ) -> Result<Option<UploadRecord>, AppError>;

    /// Move a record to `status`, writing `location` when completing it.
    ///
    /// Fails with `InvalidStateTransition` unless the record is currently `processing`.
    async fn update_status_and_location(
        &self,
        file_id: Uuid,
        status: UploadStatus,
        location: Option<StoredLocation>,
    ) -> Result<UploadRecord, AppError>;

    async fn get(&self, file_id: Uuid) -> Result<Option<UploadRecord>, AppError>;
}

/// Validate a status change and derive the `(file_path, storage_key)` columns to write.
///
/// Completing requires a location; failing clears it.
pub fn plan_transition(
    current: UploadStatus,
    next: UploadStatus,
    location: Option<StoredLocation>,
) -> Result<(String, Option<String>), AppError> {
    if !current.can_transition_to(next) {
        return Err(AppError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }

    match (next, location) {
        (UploadStatus::Completed, Some(location)) if !location.url.is_empty() => {
            Ok((location.url, Some(location.storage_key)))
        }
        (UploadStatus::Completed, _) => Err(AppError::Internal(
            "A completed upload requires a storage location".to_string(),
        )),
        _ => Ok((String::new(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> StoredLocation {
        StoredLocation {
            url: "https://bucket.s3.us-east-1.amazonaws.com/u/k.mp3".to_string(),
            storage_key: "u/k.mp3".to_string(),
        }
    }

    #[test]
    fn test_completion_writes_location() {
        let (path, key) =
            plan_transition(UploadStatus::Processing, UploadStatus::Completed, Some(location()))
                .unwrap();
        assert!(!path.is_empty());
        assert_eq!(key.as_deref(), Some("u/k.mp3"));
    }

    #[test]
    fn test_completion_without_location_rejected() {
        let result = plan_transition(UploadStatus::Processing, UploadStatus::Completed, None);
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_error_clears_location() {
        let (path, key) =
            plan_transition(UploadStatus::Processing, UploadStatus::Error, Some(location()))
                .unwrap();
        assert!(path.is_empty());
        assert!(key.is_none());
    }

    #[test]
    fn test_terminal_record_cannot_move() {
        let result = plan_transition(UploadStatus::Completed, UploadStatus::Error, None);
        assert!(matches!(
            result,
            Err(AppError::InvalidStateTransition {
                from: UploadStatus::Completed,
                to: UploadStatus::Error
            })
        ));
    }
}
