use crate::auth::middleware::resolve_session;
use crate::auth::models::UserContext;
use crate::auth::password::verify_password;
use crate::auth::session::{
    clear_session_cookie, generate_session_token, hash_session_token, read_session_cookie,
    session_cookie,
};
use crate::error::{ErrorResponse, FormBody, HttpAppError};
use crate::state::AppState;
use audiovault_core::models::UserOut;
use audiovault_core::AppError;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

const INVALID_CREDENTIALS: &str = "Incorrect username or password";

#[derive(Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// Manual Debug so the password never reaches the logs.
impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Session cookie issued", body = MessageResponse),
        (status = 400, description = "Incorrect username or password", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, form), fields(username = %form.username, operation = "login"))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    FormBody(form): FormBody<LoginForm>,
) -> Result<Response, HttpAppError> {
    let user = state
        .db
        .users
        .get_by_username(&form.username)
        .await?
        .ok_or_else(|| AppError::BadRequest(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(&form.password, &user.password_hash)? {
        tracing::info!("Login rejected: wrong password");
        return Err(AppError::BadRequest(INVALID_CREDENTIALS.to_string()).into());
    }

    state.db.users.touch_last_login(user.user_id).await?;
    let removed = state.db.sessions.delete_for_user(user.user_id).await?;

    let token = generate_session_token();
    let expires_at = Utc::now() + Duration::minutes(state.sessions.expiry_minutes);
    state
        .db
        .sessions
        .create(user.user_id, &hash_session_token(&token), expires_at)
        .await?;

    tracing::info!(user_id = %user.user_id, previous_sessions = removed, "Login successful");

    let cookie = session_cookie(
        &token,
        state.sessions.max_age_secs(),
        state.sessions.cookie_secure,
    );
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse {
            message: "Login successful".to_string(),
        }),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserOut),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "me"))]
pub async fn me(
    State(state): State<Arc<AppState>>,
    user: UserContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let user = state
        .db
        .users
        .get_by_id(user.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session expired or invalid".to_string()))?;

    Ok(Json(UserOut::from(user)))
}

#[utoipa::path(
    get,
    path = "/auth/auth-status",
    tag = "auth",
    responses(
        (status = 200, description = "Session is valid", body = AuthStatusResponse),
        (status = 401, description = "No valid session")
    )
)]
pub async fn auth_status(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    match resolve_session(&state.auth, &headers).await {
        Ok(_) => Json(AuthStatusResponse {
            authenticated: true,
        })
        .into_response(),
        Err(AppError::Unauthorized(_)) => StatusCode::UNAUTHORIZED.into_response(),
        Err(e) => HttpAppError(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session removed", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers), fields(operation = "logout"))]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let token = read_session_cookie(&headers)
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    state
        .db
        .sessions
        .delete_by_token_hash(&hash_session_token(&token))
        .await?;

    Ok((
        [(
            header::SET_COOKIE,
            clear_session_cookie(state.sessions.cookie_secure),
        )],
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
        .into_response())
}
