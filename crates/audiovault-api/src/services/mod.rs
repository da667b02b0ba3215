pub mod materializer;
pub mod reaper;
pub mod upload;

pub use materializer::{MaterializeJob, MaterializerConfig, MaterializerQueue};
pub use reaper::StaleUploadReaper;
pub use upload::{IngestedFile, UploadLimits, UploadRequest, UploadService};

#[cfg(test)]
pub(crate) mod test_support;
