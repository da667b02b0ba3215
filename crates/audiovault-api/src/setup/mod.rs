//! Application setup and initialization
//!
//! Everything `main` needs to turn a `Config` into a running router lives here so the
//! integration tests can build the same application.

pub mod database;
pub mod routes;
pub mod seed;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use audiovault_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format())
        .context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;
    let state = services::initialize_services(&config, pool, storage).await?;

    if config.seed_demo_users() {
        seed::seed_demo_users(&state.db.users, config.seed_user_password())
            .await
            .context("Failed to seed demo users")?;
    }

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
