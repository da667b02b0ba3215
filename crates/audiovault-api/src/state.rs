//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only what they need
//! via Axum's `FromRef`.

use crate::auth::middleware::AuthState;
use crate::services::UploadService;
use audiovault_core::Config;
use audiovault_db::{SessionRepository, UploadRecordRepository, UserRepository};
use audiovault_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Database pool and repositories.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub uploads: UploadRecordRepository,
    pub users: UserRepository,
    pub sessions: SessionRepository,
}

/// Durable storage and the upload pipeline.
#[derive(Clone)]
pub struct MediaState {
    pub storage: Arc<dyn Storage>,
    pub upload_service: UploadService,
    pub playback_url_ttl: Duration,
}

/// Session settings used when issuing cookies.
#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub expiry_minutes: i64,
    pub cookie_secure: bool,
}

impl SessionSettings {
    pub fn max_age_secs(&self) -> i64 {
        self.expiry_minutes * 60
    }
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub media: MediaState,
    pub auth: Arc<AuthState>,
    pub sessions: SessionSettings,
    pub config: Config,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for MediaState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.media.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for AuthState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.auth.as_ref().clone()
    }
}
