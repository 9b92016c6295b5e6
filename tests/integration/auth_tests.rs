//! Authentication and account management tests

use serde_json::{json, Value};

use crate::common::{unique_name, TestApp, TEST_PASSWORD};

#[tokio::test]
async fn test_login_returns_bearer_token() {
    let app = TestApp::new().await;
    let user = app.create_user("janet", false).await;

    let response = app
        .post_json(
            "/auth/login/",
            json!({ "username": "janet", "password": TEST_PASSWORD }),
        )
        .await;
    response.assert_ok();

    let json: Value = response.json();
    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["user"]["id"], user.id.to_string());
    assert_eq!(json["user"]["is_staff"], false);
    assert!(json["user"].get("password_hash").is_none());

    let token = json["access_token"].as_str().unwrap();
    let me: Value = app.get_with_auth("/auth/me/", token).await.json();
    assert_eq!(me["username"], "janet");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new().await;
    app.create_user("mallory", false).await;

    let response = app
        .post_json(
            "/auth/login/",
            json!({ "username": "mallory", "password": "guess" }),
        )
        .await;
    response.assert_unauthorized();
    assert_eq!(response.error_message(), "Invalid username or password");
}

#[tokio::test]
async fn test_login_unknown_user_matches_wrong_password() {
    let app = TestApp::new().await;
    let response = app
        .post_json(
            "/auth/login/",
            json!({ "username": "nobody", "password": TEST_PASSWORD }),
        )
        .await;
    response.assert_unauthorized();
    assert_eq!(response.error_message(), "Invalid username or password");
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = TestApp::new().await;
    app.post_json("/auth/login/", json!({ "username": " ", "password": "x" }))
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new().await;
    app.get("/auth/me/").await.assert_unauthorized();
}

#[tokio::test]
async fn test_staff_creates_and_lists_users() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let username = unique_name("clerk");

    let response = app
        .post_json_with_auth(
            "/admin/api/users/",
            json!({
                "username": username,
                "email": "clerk@example.com",
                "password": "long-enough-password",
                "is_staff": true
            }),
            &token,
        )
        .await;
    response.assert_created();
    let created: Value = response.json();
    assert_eq!(created["is_staff"], true);

    let users: Vec<Value> = app.get_with_auth("/admin/api/users/", &token).await.json();
    assert!(users.iter().any(|u| u["username"] == username.as_str()));
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    app.create_user("taken", false).await;

    app.post_json_with_auth(
        "/admin/api/users/",
        json!({ "username": "taken", "password": "long-enough-password" }),
        &token,
    )
    .await
    .assert_conflict();
}

#[tokio::test]
async fn test_short_password_rejected() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;

    let response = app
        .post_json_with_auth(
            "/admin/api/users/",
            json!({ "username": "shorty", "password": "abc" }),
            &token,
        )
        .await;
    response.assert_bad_request();
}
