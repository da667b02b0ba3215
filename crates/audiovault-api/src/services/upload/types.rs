//! Types used by the upload service

use audiovault_core::constants::{
    DEFAULT_ALLOWED_AUDIO_CONTENT_TYPES, MAX_UPLOAD_SIZE_BYTES, UPLOAD_CHUNK_SIZE_BYTES,
};
use audiovault_core::models::AudioCategory;
use audiovault_core::Config;
use std::path::PathBuf;
use tempfile::TempPath;
use uuid::Uuid;

/// Limits and locations the synchronous upload path enforces
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub scratch_dir: PathBuf,
    pub max_size_bytes: u64,
    pub chunk_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
}

impl UploadLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            scratch_dir: PathBuf::from(config.upload_dir()),
            max_size_bytes: config.max_upload_size_bytes(),
            chunk_size_bytes: config.upload_chunk_size_bytes(),
            allowed_content_types: config.allowed_audio_content_types().to_vec(),
        }
    }

    /// Built-in defaults with scratch files under `scratch_dir`.
    pub fn with_scratch_dir(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            max_size_bytes: MAX_UPLOAD_SIZE_BYTES,
            chunk_size_bytes: UPLOAD_CHUNK_SIZE_BYTES,
            allowed_content_types: DEFAULT_ALLOWED_AUDIO_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// A fully received upload sitting in scratch storage.
///
/// The scratch file is deleted when this value (or the `TempPath` moved out of it) is
/// dropped, so every early return cleans up after itself.
#[derive(Debug)]
pub struct IngestedFile {
    pub path: TempPath,
    /// Hex-encoded SHA-256 of the received bytes
    pub digest: String,
    pub size: u64,
}

impl IngestedFile {
    /// Remove the scratch file now, logging instead of failing if removal does not succeed.
    pub fn discard(self) {
        let path_display = self.path.display().to_string();
        if let Err(e) = self.path.close() {
            tracing::warn!(path = %path_display, error = %e, "Failed to remove scratch file");
        }
    }
}

/// Everything the orchestrator needs once the multipart body has been consumed
#[derive(Debug)]
pub struct UploadRequest {
    pub user_id: Uuid,
    pub description: String,
    pub category: AudioCategory,
    /// Sanitized original filename
    pub filename: String,
    pub content_type: String,
    pub file: IngestedFile,
}
