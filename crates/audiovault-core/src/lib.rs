//! Audiovault Core Library
//!
//! Domain models, the unified error taxonomy, configuration and account validation
//! shared by every audiovault crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{AppConfig, Config};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AccountType, AudioCategory, AudioFileOut, NewUploadRecord, Session, StoredLocation,
    UploadRecord, UploadStatus, User, UserOut,
};
pub use storage_types::StorageBackend;
