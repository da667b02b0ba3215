//! Route configuration and setup.

use crate::auth::middleware::session_auth_middleware;
use crate::handlers::{admin, auth, files, health, users};
use crate::state::AppState;
use audiovault_core::{Config, StorageBackend};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and the text fields on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let protected = protected_routes().layer(axum::middleware::from_fn_with_state(
        state.auth.clone(),
        session_auth_middleware,
    ));

    let mut app = public_routes().merge(protected).nest(
        "/docs",
        utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
            .path("/docs")
            .into(),
    );

    if let Some(media) = local_media_service(config) {
        app = app.nest_service("/media", media);
    }

    let body_limit = config
        .max_upload_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    let app = app
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    // Credentials cannot be combined with a wildcard origin.
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::COOKIE])
            .allow_credentials(true)
    };
    Ok(cors)
}

/// Serves stored objects when the local backend is in use; S3 serves its own.
fn local_media_service(config: &Config) -> Option<ServeDir> {
    if config.storage_backend() != StorageBackend::Local {
        return None;
    }
    config.local_storage_path().map(ServeDir::new)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/login", post(auth::login))
        .route("/auth/auth-status", get(auth::auth_status))
        .route("/auth/logout", post(auth::logout))
        .route("/users", post(users::register))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/users/{id}", put(users::update_user))
        .route(
            "/admin/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route(
            "/admin/users/{id}",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route("/files", get(files::list_files))
        .route("/files/upload", post(files::upload_file))
        .route("/files/upload-status/{id}", get(files::upload_status))
        .route("/files/{id}", axum::routing::delete(files::delete_file))
        .route("/files/{id}/playback", get(files::playback_file))
}
