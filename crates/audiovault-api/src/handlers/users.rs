use crate::auth::models::UserContext;
use crate::auth::password::{hash_optional_password, hash_password};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use audiovault_core::models::{AccountType, UserCreate, UserOut, UserUpdate};
use audiovault_core::AppError;
use audiovault_db::NewUser;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// Build the row for a new regular account from a registration payload.
pub(crate) fn new_regular_user(payload: UserCreate) -> Result<NewUser, AppError> {
    Ok(NewUser {
        password_hash: hash_password(&payload.password)?,
        username: payload.username,
        email: payload.email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        account_type: AccountType::Regular,
    })
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = UserCreate,
    responses(
        (status = 200, description = "Account created", body = UserOut),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Username or email already registered", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, payload), fields(username = %payload.username, operation = "register"))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<UserCreate>,
) -> Result<impl IntoResponse, HttpAppError> {
    let user = state.db.users.create(new_regular_user(payload)?).await?;
    tracing::info!(user_id = %user.user_id, "User registered");
    Ok(Json(UserOut::from(user)))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Account updated", body = UserOut),
        (status = 403, description = "Not authorized to update this user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id, target_user_id = %id, operation = "update_self"))]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UserUpdate>,
) -> Result<impl IntoResponse, HttpAppError> {
    if state.db.users.get_by_id(id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()).into());
    }
    if id != user.user_id {
        return Err(AppError::Forbidden("Not authorized to update this user".to_string()).into());
    }

    let password_hash = hash_optional_password(payload.password.as_deref())?;
    let updated = state
        .db
        .users
        .update_credentials(id, &payload.username, &payload.email, password_hash)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserOut::from(updated)))
}
