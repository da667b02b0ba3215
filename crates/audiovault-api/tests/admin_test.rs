mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::auth::{login, login_admin, login_user1};
use helpers::setup_test_app;
use serde_json::{json, Value};
use std::time::Duration;

#[tokio::test]
async fn test_admin_routes_require_superuser() {
    let app = setup_test_app().await;

    app.client()
        .get("/admin/users")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let user = login_user1(app.client()).await;
    let response = user.apply(app.client().get("/admin/users")).await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"], "Not authorized as admin");

    let admin = login_admin(app.client()).await;
    let listed: Value = admin.apply(app.client().get("/admin/users")).await.json();
    let usernames: Vec<&str> = listed
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|u| u["username"].as_str())
        .collect();
    assert!(usernames.contains(&"user1"));
    assert!(usernames.contains(&"admin"));
}

#[tokio::test]
async fn test_admin_creates_and_updates_user() {
    let app = setup_test_app().await;
    let admin = login_admin(app.client()).await;

    let created: Value = admin
        .apply(app.client().post("/admin/users"))
        .json(&json!({
            "username": "narrator",
            "email": "narrator@example.com",
            "password": "Narr4te!Now",
            "first_name": "Nora",
            "last_name": "Rator"
        }))
        .await
        .json();
    let id = created["user_id"].as_str().expect("user_id").to_string();
    assert_eq!(created["account_type"], "regular");

    let response = admin
        .apply(app.client().put(&format!("/admin/users/{}", id)))
        .json(&json!({
            "username": "narrator",
            "email": "narrator@example.com",
            "password": "N3w!Password",
            "first_name": "Nora",
            "last_name": "Reader"
        }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["last_name"], "Reader");

    login(app.client(), "narrator", "N3w!Password").await;
}

#[tokio::test]
async fn test_admin_delete_removes_user_and_files() {
    let app = setup_test_app().await;
    let user = login_user1(app.client()).await;
    let admin = login_admin(app.client()).await;

    let form = MultipartForm::new()
        .add_text("description", "Soon gone")
        .add_text("category", "Music")
        .add_part(
            "file",
            Part::bytes(b"to be removed".to_vec())
                .file_name("gone.mp3")
                .mime_type("audio/mpeg"),
        );
    let accepted: Value = user
        .apply(app.client().post("/files/upload"))
        .multipart(form)
        .await
        .json();
    let file_id = accepted["file_id"].as_str().expect("file_id").to_string();

    let mut completed = false;
    for _ in 0..200 {
        let status: Value = user
            .apply(app.client().get(&format!("/files/upload-status/{}", file_id)))
            .await
            .json();
        if status["upload_status"] == "completed" {
            completed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert!(completed);

    let me: Value = user.apply(app.client().get("/auth/me")).await.json();
    let user_id = me["user_id"].as_str().expect("user_id").to_string();

    let response = admin
        .apply(app.client().delete(&format!("/admin/users/{}", user_id)))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["detail"], "User and all associated files deleted");

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audio_files")
        .fetch_one(app.pool())
        .await
        .expect("count");
    assert_eq!(remaining, 0);

    let user_dir = app.storage_dir.join(&user_id);
    let leftover = std::fs::read_dir(&user_dir)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftover, 0);

    admin
        .apply(app.client().delete(&format!("/admin/users/{}", user_id)))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
