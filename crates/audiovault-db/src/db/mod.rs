//! Database repositories for the data access layer
//!
//! Each repository owns one table and returns `AppError` so callers can propagate with `?`.

pub mod record_store;
pub mod session;
pub mod transaction;
pub mod upload;
pub mod user;

pub use record_store::UploadRecordStore;
pub use session::SessionRepository;
pub use transaction::with_transaction;
pub use upload::UploadRecordRepository;
pub use user::{NewUser, UserRepository};

use audiovault_core::AppError;

/// Map a unique-constraint violation to `Conflict`, everything else to `Database`.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> AppError {
    let is_unique_violation = err
        .as_database_error()
        .and_then(|db_err| db_err.code())
        .map(|code| code == "23505")
        .unwrap_or(false);

    if is_unique_violation {
        AppError::Conflict(message.to_string())
    } else {
        AppError::Database(err)
    }
}
