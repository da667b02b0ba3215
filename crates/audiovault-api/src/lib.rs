//! Audiovault API Library
//!
//! HTTP handlers, session authentication, the upload pipeline and application setup.

mod api_doc;
mod handlers;
mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

pub use api_doc::{get_openapi_spec, ApiDoc};
pub use error::ErrorResponse;
pub use services::{MaterializerQueue, StaleUploadReaper, UploadService};
