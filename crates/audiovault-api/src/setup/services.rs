//! Service and repository wiring

use crate::auth::middleware::AuthState;
use crate::services::{
    MaterializerConfig, MaterializerQueue, StaleUploadReaper, UploadLimits, UploadService,
};
use crate::state::{AppState, DbState, MediaState, SessionSettings};
use anyhow::Result;
use audiovault_core::Config;
use audiovault_db::{SessionRepository, UploadRecordRepository, UserRepository};
use audiovault_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Build repositories, the upload pipeline and the shared application state.
pub async fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let uploads = UploadRecordRepository::new(pool.clone());
    let users = UserRepository::new(pool.clone());
    let sessions = SessionRepository::new(pool.clone());

    let queue = MaterializerQueue::new(
        Arc::new(uploads.clone()),
        storage.clone(),
        MaterializerConfig::from_config(config),
    );
    let upload_service = UploadService::new(
        Arc::new(uploads.clone()),
        queue,
        UploadLimits::from_config(config),
    );

    match StaleUploadReaper::from_config(uploads.clone(), config) {
        Some(reaper) => {
            Arc::new(reaper).start();
            tracing::info!(
                interval_secs = config.stale_upload_reap_interval_secs(),
                grace_period_secs = config.stale_upload_grace_period_secs(),
                "Stale upload reaper started"
            );
        }
        None => tracing::debug!("Stale upload reaper disabled"),
    }

    let state = AppState {
        db: DbState {
            pool,
            uploads,
            users: users.clone(),
            sessions: sessions.clone(),
        },
        media: MediaState {
            storage,
            upload_service,
            playback_url_ttl: Duration::from_secs(config.playback_url_ttl_secs()),
        },
        auth: Arc::new(AuthState { users, sessions }),
        sessions: SessionSettings {
            expiry_minutes: config.session_expiry_minutes(),
            cookie_secure: config.session_cookie_secure(),
        },
        config: config.clone(),
    };

    Ok(Arc::new(state))
}
