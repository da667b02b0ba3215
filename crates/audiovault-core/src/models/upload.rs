use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle state of an upload record.
///
/// A record starts in `Processing` and moves exactly once to `Completed` or `Error`.
/// Both terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "upload_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Processing,
    Completed,
    Error,
}

impl UploadStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Completed | UploadStatus::Error)
    }

    /// Only `processing -> completed` and `processing -> error` are legal.
    pub fn can_transition_to(&self, next: UploadStatus) -> bool {
        matches!(
            (self, next),
            (UploadStatus::Processing, UploadStatus::Completed)
                | (UploadStatus::Processing, UploadStatus::Error)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Processing => "processing",
            UploadStatus::Completed => "completed",
            UploadStatus::Error => "error",
        }
    }
}

impl Display for UploadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Closed set of audio categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "audio_category"))]
pub enum AudioCategory {
    Music,
    Podcast,
    #[serde(rename = "Voice Note")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Voice Note"))]
    VoiceNote,
    Audiobook,
    Others,
}

impl AudioCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioCategory::Music => "Music",
            AudioCategory::Podcast => "Podcast",
            AudioCategory::VoiceNote => "Voice Note",
            AudioCategory::Audiobook => "Audiobook",
            AudioCategory::Others => "Others",
        }
    }
}

impl Display for AudioCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Music" => Ok(AudioCategory::Music),
            "Podcast" => Ok(AudioCategory::Podcast),
            "Voice Note" | "VoiceNote" => Ok(AudioCategory::VoiceNote),
            "Audiobook" => Ok(AudioCategory::Audiobook),
            "Others" => Ok(AudioCategory::Others),
            other => Err(format!(
                "Invalid category '{}'. Allowed: Music, Podcast, Voice Note, Audiobook, Others",
                other
            )),
        }
    }
}

/// One attempt to add an audio asset for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UploadRecord {
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub category: AudioCategory,
    /// Public locator; empty until the record is completed.
    pub file_path: String,
    /// Object key in durable storage, set together with `file_path`.
    pub storage_key: Option<String>,
    pub upload_timestamp: DateTime<Utc>,
    pub processed_data: Option<JsonValue>,
    pub ai_processing_types: Option<Vec<String>>,
    pub checksum: Option<String>,
    pub upload_status: UploadStatus,
}

impl UploadRecord {
    pub fn location(&self) -> Option<&str> {
        if self.file_path.is_empty() {
            None
        } else {
            Some(self.file_path.as_str())
        }
    }

    pub fn is_completed(&self) -> bool {
        self.upload_status == UploadStatus::Completed
    }
}

/// Values supplied when a new record is created after ingest and dedup pass.
#[derive(Debug, Clone)]
pub struct NewUploadRecord {
    pub user_id: Uuid,
    pub description: String,
    pub category: AudioCategory,
    pub checksum: String,
}

/// Where a materialized upload lives in durable storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLocation {
    /// Public locator written to `file_path`.
    pub url: String,
    pub storage_key: String,
}

/// Record representation returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AudioFileOut {
    pub file_id: Uuid,
    pub description: String,
    pub category: AudioCategory,
    pub file_path: String,
    pub upload_timestamp: DateTime<Utc>,
    #[schema(value_type = Option<Object>)]
    pub processed_data: Option<JsonValue>,
    pub ai_processing_types: Option<Vec<String>>,
    pub checksum: Option<String>,
    pub upload_status: UploadStatus,
}

impl From<UploadRecord> for AudioFileOut {
    fn from(record: UploadRecord) -> Self {
        AudioFileOut {
            file_id: record.file_id,
            description: record.description,
            category: record.category,
            file_path: record.file_path,
            upload_timestamp: record.upload_timestamp,
            processed_data: record.processed_data,
            ai_processing_types: record.ai_processing_types,
            checksum: record.checksum,
            upload_status: record.upload_status,
        }
    }
}
