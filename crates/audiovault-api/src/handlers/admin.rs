//! Account administration, superusers only.

use crate::auth::models::AdminContext;
use crate::auth::password::hash_optional_password;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::files::DetailResponse;
use crate::handlers::users::new_regular_user;
use crate::state::AppState;
use audiovault_core::models::{AdminUserUpdate, UserCreate, UserOut};
use audiovault_core::AppError;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    responses(
        (status = 200, description = "All accounts", body = Vec<UserOut>),
        (status = 403, description = "Not authorized as admin", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, admin), fields(user_id = %admin.0.user_id, operation = "admin_list_users"))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let users: Vec<UserOut> = state
        .db
        .users
        .list()
        .await?
        .into_iter()
        .map(UserOut::from)
        .collect();
    Ok(Json(users))
}

#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "admin",
    request_body = UserCreate,
    responses(
        (status = 200, description = "Account created", body = UserOut),
        (status = 403, description = "Not authorized as admin", body = ErrorResponse),
        (status = 409, description = "Username or email already registered", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, admin, payload), fields(user_id = %admin.0.user_id, operation = "admin_create_user"))]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
    ValidatedJson(payload): ValidatedJson<UserCreate>,
) -> Result<impl IntoResponse, HttpAppError> {
    let user = state.db.users.create(new_regular_user(payload)?).await?;
    tracing::info!(created_user_id = %user.user_id, "Account created by admin");
    Ok(Json(UserOut::from(user)))
}

#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AdminUserUpdate,
    responses(
        (status = 200, description = "Account updated", body = UserOut),
        (status = 403, description = "Not authorized as admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, admin, payload), fields(user_id = %admin.0.user_id, target_user_id = %id, operation = "admin_update_user"))]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AdminUserUpdate>,
) -> Result<impl IntoResponse, HttpAppError> {
    let password_hash = hash_optional_password(payload.password.as_deref())?;
    let updated = state
        .db
        .users
        .update_profile(
            id,
            &payload.username,
            &payload.email,
            &payload.first_name,
            &payload.last_name,
            password_hash,
        )
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserOut::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User and files deleted", body = DetailResponse),
        (status = 403, description = "Not authorized as admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, admin), fields(user_id = %admin.0.user_id, target_user_id = %id, operation = "admin_delete_user"))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let records = state.db.uploads.list_for_user(id).await?;
    for record in records {
        let Some(key) = record.storage_key.as_deref() else {
            continue;
        };
        // Best effort: the account goes away even if an object cannot be removed.
        if let Err(e) = state.media.storage.delete(key).await {
            tracing::error!(storage_key = %key, error = %e, "Failed to delete stored object");
        }
    }

    if !state.db.users.delete(id).await? {
        return Err(AppError::NotFound("User not found".to_string()).into());
    }

    tracing::info!(deleted_user_id = %id, "User and files deleted");
    Ok(Json(DetailResponse {
        detail: "User and all associated files deleted".to_string(),
    }))
}
