//! Shared key generation for storage backends.

use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

/// Build the durable storage key for an audio upload: `{user_id}/{uuid}_{filename}`.
///
/// `filename` must already be sanitized; path separators are replaced defensively so the
/// key always has exactly two segments.
pub fn generate_audio_key(user_id: Uuid, filename: &str) -> String {
    let filename = filename.replace(['/', '\\'], "_");
    format!("{}/{}_{}", user_id, Uuid::new_v4(), filename)
}

/// Reject keys that could escape the storage namespace.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
