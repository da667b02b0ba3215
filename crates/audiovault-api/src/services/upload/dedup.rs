//! Duplicate detection against a user's completed uploads.

use audiovault_core::AppError;
use audiovault_db::UploadRecordStore;
use uuid::Uuid;

/// Reject the upload if a completed record of this user already has the same content
/// digest, or failing that the exact same description.
///
/// Records still `processing` are ignored, so two concurrent uploads of the same bytes
/// can both get through.
pub async fn ensure_not_duplicate(
    store: &dyn UploadRecordStore,
    user_id: Uuid,
    digest: &str,
    description: &str,
) -> Result<(), AppError> {
    if let Some(existing) = store
        .find_completed_by_user_and_digest(user_id, digest)
        .await?
    {
        tracing::info!(
            user_id = %user_id,
            existing_file_id = %existing.file_id,
            "Rejected upload with duplicate content"
        );
        return Err(AppError::DuplicateContent {
            file_id: existing.file_id,
            description: existing.description,
        });
    }

    if store
        .find_completed_by_user_and_description(user_id, description)
        .await?
        .is_some()
    {
        tracing::info!(user_id = %user_id, "Rejected upload with duplicate description");
        return Err(AppError::DuplicateDescription {
            description: description.to_string(),
        });
    }

    Ok(())
}
