use crate::error::ErrorResponse;
use audiovault_core::models::AccountType;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use uuid::Uuid;

/// Authenticated caller, resolved from the session cookie and stored in request extensions
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: Uuid,
    pub username: String,
    pub account_type: AccountType,
    pub session_id: Uuid,
}

impl UserContext {
    pub fn is_superuser(&self) -> bool {
        self.account_type == AccountType::Superuser
    }
}

/// Authenticated caller with superuser rights
#[derive(Debug, Clone)]
pub struct AdminContext(pub UserContext);

fn unauthenticated() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Not authenticated".to_string(),
            details: None,
            error_type: None,
            code: "UNAUTHORIZED".to_string(),
            recoverable: false,
            suggested_action: Some("Log in and retry with a valid session".to_string()),
        }),
    )
}

// Extension cannot be used with Multipart, so we extract directly from request parts
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserContext>()
            .cloned()
            .ok_or_else(unauthenticated)
    }
}

impl<S> FromRequestParts<S> for AdminContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = UserContext::from_request_parts(parts, state).await?;
        if !user.is_superuser() {
            return Err((
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::new("Not authorized as admin", "FORBIDDEN")),
            ));
        }
        Ok(AdminContext(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn context(account_type: AccountType) -> UserContext {
        UserContext {
            user_id: Uuid::new_v4(),
            username: "user1".to_string(),
            account_type,
            session_id: Uuid::new_v4(),
        }
    }

    fn parts_with(ctx: Option<UserContext>) -> Parts {
        let mut request = Request::new(());
        if let Some(ctx) = ctx {
            request.extensions_mut().insert(ctx);
        }
        request.into_parts().0
    }

    #[tokio::test]
    async fn missing_context_is_unauthorized() {
        let mut parts = parts_with(None);
        let (status, body) = UserContext::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.0.error, "Not authenticated");
    }

    #[tokio::test]
    async fn regular_user_is_not_admin() {
        let mut parts = parts_with(Some(context(AccountType::Regular)));
        let (status, _) = AdminContext::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn superuser_is_admin() {
        let mut parts = parts_with(Some(context(AccountType::Superuser)));
        let AdminContext(ctx) = AdminContext::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(ctx.is_superuser());
    }
}
