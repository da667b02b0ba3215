mod helpers;

use axum::http::{header, StatusCode};
use helpers::auth::{login, login_user1};
use helpers::{setup_test_app, SEED_PASSWORD};
use serde_json::{json, Value};

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/auth/login")
        .form(&[("username", "user1"), ("password", SEED_PASSWORD)])
        .await;
    response.assert_status_ok();

    let set_cookie = response.header(header::SET_COOKIE);
    let set_cookie = set_cookie.to_str().expect("ascii cookie");
    assert!(set_cookie.starts_with("session_token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=3600"));

    let body: Value = response.json();
    assert_eq!(body["message"], "Login successful");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let app = setup_test_app().await;

    for (username, password) in [("user1", "wrong-password"), ("nobody", SEED_PASSWORD)] {
        let response = app
            .client()
            .post("/auth/login")
            .form(&[("username", username), ("password", password)])
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Incorrect username or password");
    }
}

#[tokio::test]
async fn test_auth_status_and_me() {
    let app = setup_test_app().await;

    app.client()
        .get("/auth/auth-status")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let session = login_user1(app.client()).await;
    let status: Value = session
        .apply(app.client().get("/auth/auth-status"))
        .await
        .json();
    assert_eq!(status["authenticated"], true);

    let me = session.apply(app.client().get("/auth/me")).await;
    me.assert_status_ok();
    let me: Value = me.json();
    assert_eq!(me["username"], "user1");
    assert_eq!(me["email"], "john.doe@example.com");
    assert_eq!(me["account_type"], "regular");
    assert!(me.get("password_hash").is_none());
    assert!(!me["last_logged_in"].is_null());
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let app = setup_test_app().await;
    let session = login_user1(app.client()).await;

    let response = session.apply(app.client().post("/auth/logout")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Logged out successfully");

    session
        .apply(app.client().get("/auth/me"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_new_login_replaces_previous_session() {
    let app = setup_test_app().await;
    let first = login_user1(app.client()).await;
    let second = login_user1(app.client()).await;

    first
        .apply(app.client().get("/auth/me"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    second
        .apply(app.client().get("/auth/me"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_register_then_login() {
    let app = setup_test_app().await;

    let payload = json!({
        "username": "listener",
        "email": "listener@example.com",
        "password": "Secur3!Pass",
        "first_name": "Lee",
        "last_name": "Stener"
    });
    let response = app.client().post("/users").json(&payload).await;
    response.assert_status_ok();
    let created: Value = response.json();
    assert_eq!(created["account_type"], "regular");

    app.client()
        .post("/users")
        .json(&payload)
        .await
        .assert_status(StatusCode::CONFLICT);

    login(app.client(), "listener", "Secur3!Pass").await;
}

#[tokio::test]
async fn test_register_rejects_weak_password_and_bad_email() {
    let app = setup_test_app().await;

    let weak = json!({
        "username": "weak",
        "email": "weak@example.com",
        "password": "password",
        "first_name": "W",
        "last_name": "K"
    });
    app.client()
        .post("/users")
        .json(&weak)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let bad_email = json!({
        "username": "bademail",
        "email": "not-an-email",
        "password": "Secur3!Pass",
        "first_name": "B",
        "last_name": "E"
    });
    app.client()
        .post("/users")
        .json(&bad_email)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_can_only_update_self() {
    let app = setup_test_app().await;
    let session = login_user1(app.client()).await;

    let me: Value = session.apply(app.client().get("/auth/me")).await.json();
    let my_id = me["user_id"].as_str().expect("user_id").to_string();

    let update = json!({ "username": "user1", "email": "john.new@example.com", "password": "" });
    let response = session
        .apply(app.client().put(&format!("/users/{}", my_id)))
        .json(&update)
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["email"], "john.new@example.com");

    // Blank password keeps the old one
    login(app.client(), "user1", SEED_PASSWORD).await;

    let admin_id: String = sqlx::query_scalar("SELECT user_id::text FROM users WHERE username = 'admin'")
        .fetch_one(app.pool())
        .await
        .expect("admin id");
    let session = login_user1(app.client()).await;
    session
        .apply(app.client().put(&format!("/users/{}", admin_id)))
        .json(&update)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    session
        .apply(app.client().put(&format!("/users/{}", uuid::Uuid::new_v4())))
        .json(&update)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
