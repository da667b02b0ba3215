//! Session-cookie authentication

use crate::auth::models::UserContext;
use crate::auth::session::{hash_session_token, read_session_cookie};
use crate::error::HttpAppError;
use audiovault_core::AppError;
use audiovault_db::{SessionRepository, UserRepository};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    pub users: UserRepository,
    pub sessions: SessionRepository,
}

/// Resolve the session cookie in `headers` to the user it belongs to.
pub async fn resolve_session(
    auth_state: &AuthState,
    headers: &HeaderMap,
) -> Result<UserContext, AppError> {
    let token = read_session_cookie(headers)
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let session = auth_state
        .sessions
        .find_active(&hash_session_token(&token))
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session expired or invalid".to_string()))?;

    let user = auth_state
        .users
        .get_by_id(session.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session expired or invalid".to_string()))?;

    Ok(UserContext {
        user_id: user.user_id,
        username: user.username,
        account_type: user.account_type,
        session_id: session.session_id,
    })
}

pub async fn session_auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_session(&auth_state, request.headers()).await {
        Ok(user_context) => {
            tracing::debug!(user_id = %user_context.user_id, "Session authenticated");
            request.extensions_mut().insert(user_context);
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}
