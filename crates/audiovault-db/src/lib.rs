//! Audiovault Database Library
//!
//! PostgreSQL repositories for users, sessions and upload records, plus the
//! `UploadRecordStore` seam used by the upload pipeline.

pub mod db;

pub use db::record_store::plan_transition;
pub use db::{
    with_transaction, NewUser, SessionRepository, UploadRecordRepository, UploadRecordStore,
    UserRepository,
};
