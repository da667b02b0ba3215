//! Pipeline constants shared by configuration defaults and tests.

/// Maximum accepted size of one audio upload (1 GiB).
pub const MAX_UPLOAD_SIZE_BYTES: u64 = 1024 * 1024 * 1024;

/// Size of each chunk read from the request body during ingest (1 MiB).
pub const UPLOAD_CHUNK_SIZE_BYTES: usize = 1024 * 1024;

/// Audio MIME types accepted by the upload endpoint.
pub const DEFAULT_ALLOWED_AUDIO_CONTENT_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/wav",
    "audio/mp3",
    "audio/ogg",
    "application/ogg",
    "audio/x-wav",
];

/// Scratch directory for in-flight uploads.
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "session_token";

pub const SIZE_LIMIT_MESSAGE: &str = "File size exceeds the maximum allowed limit of 1GB";
