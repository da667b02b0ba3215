//! Upload pipeline: chunked ingest, dedup guard and the orchestrating service.

pub mod dedup;
pub mod ingest;
pub mod service;
pub mod types;

pub use service::UploadService;
pub use types::{IngestedFile, UploadLimits, UploadRequest};
