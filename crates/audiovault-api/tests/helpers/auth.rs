use axum::http::{header, HeaderName, HeaderValue};
use axum_test::{TestRequest, TestServer};

use super::SEED_PASSWORD;

/// Cookie header for an authenticated session
#[derive(Clone)]
pub struct Session(HeaderValue);

impl Session {
    /// Attach the session cookie to a request
    pub fn apply(&self, request: TestRequest) -> TestRequest {
        request.add_header(HeaderName::from(header::COOKIE), self.0.clone())
    }
}

/// Log in and return the session cookie
pub async fn login(server: &TestServer, username: &str, password: &str) -> Session {
    let response = server
        .post("/auth/login")
        .form(&[("username", username), ("password", password)])
        .await;
    response.assert_status_ok();

    let token = response.cookie("session_token");
    let value = HeaderValue::from_str(&format!("session_token={}", token.value()))
        .expect("session token is a valid header value");
    Session(value)
}

pub async fn login_user1(server: &TestServer) -> Session {
    login(server, "user1", SEED_PASSWORD).await
}

pub async fn login_admin(server: &TestServer) -> Session {
    login(server, "admin", SEED_PASSWORD).await
}
