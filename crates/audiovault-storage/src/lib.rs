//! Audiovault Storage Library
//!
//! Durable object storage for finalized audio files: the `Storage` trait and its S3 and
//! local filesystem backends.
//!
//! # Storage key format
//!
//! Keys are namespaced by owner: `{user_id}/{uuid}_{filename}`. The random component
//! avoids collisions between uploads of the same filename and is unrelated to the content
//! digest. Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use audiovault_core::StorageBackend;
pub use factory::create_storage;
pub use keys::{generate_audio_key, validate_key};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
