//! Configuration validation
//!
//! Catches misconfiguration at startup, before any connection is opened.

use anyhow::Result;
use audiovault_core::Config;

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && !config.session_cookie_secure() {
        tracing::warn!("SESSION_COOKIE_SECURE is disabled in production - cookies will be sent over plain HTTP");
    }

    if config.seed_demo_users() && config.is_production() {
        tracing::warn!("SEED_DEMO_USERS is enabled in production - demo accounts will be created");
    }

    if config.upload_chunk_size_bytes() as u64 > config.max_upload_size_bytes() {
        tracing::warn!(
            chunk_size = config.upload_chunk_size_bytes(),
            max_size = config.max_upload_size_bytes(),
            "Upload chunk size exceeds the upload size cap"
        );
    }

    Ok(())
}
