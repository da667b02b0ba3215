//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use audiovault_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Audiovault API",
        version = "0.1.0",
        description = "Session-authenticated audio upload service. Uploads are accepted as `processing`, deduplicated by content digest and description, and moved to durable storage in the background; poll the upload status until it reports `completed` or `error`."
    ),
    paths(
        // Auth
        handlers::auth::login,
        handlers::auth::me,
        handlers::auth::auth_status,
        handlers::auth::logout,
        // Users
        handlers::users::register,
        handlers::users::update_user,
        // Admin
        handlers::admin::list_users,
        handlers::admin::create_user,
        handlers::admin::update_user,
        handlers::admin::delete_user,
        // Files
        handlers::files::upload_file,
        handlers::files::upload_status,
        handlers::files::list_files,
        handlers::files::delete_file,
        handlers::files::playback_file,
        // Health
        handlers::health::health_check,
    ),
    components(
        schemas(
            // Core models
            models::AudioFileOut,
            models::AudioCategory,
            models::UploadStatus,
            models::UserOut,
            models::AccountType,
            models::UserCreate,
            models::UserUpdate,
            models::AdminUserUpdate,
            // Handler types
            handlers::auth::LoginForm,
            handlers::auth::MessageResponse,
            handlers::auth::AuthStatusResponse,
            handlers::files::DetailResponse,
            handlers::files::PlaybackResponse,
            handlers::health::HealthCheckResponse,
            // Error
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "auth", description = "Login, logout and session status"),
        (name = "users", description = "Registration and self-service account updates"),
        (name = "admin", description = "Account administration (superusers only)"),
        (name = "files", description = "Audio upload, status polling, listing, deletion and playback"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_upload_paths() {
        let spec = get_openapi_spec();
        assert!(spec.paths.paths.contains_key("/files/upload"));
        assert!(spec.paths.paths.contains_key("/files/upload-status/{id}"));
        assert!(spec.paths.paths.contains_key("/admin/users/{id}"));
    }
}
