//! Storage setup and initialization

use anyhow::{Context, Result};
use audiovault_core::Config;
use audiovault_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(
        backend = ?storage.backend_type(),
        "Storage initialized successfully"
    );

    // Scratch area for in-flight uploads
    tokio::fs::create_dir_all(config.upload_dir())
        .await
        .with_context(|| format!("Failed to create upload directory {}", config.upload_dir()))?;

    Ok(storage)
}
