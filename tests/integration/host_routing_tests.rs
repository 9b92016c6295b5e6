//! Admin host redirect tests

use axum::{body::Body, http::Request};

use crate::common::{test_config, TestApp, TestResponse};

async fn get_on_host(app: &TestApp, host: &str, uri: &str) -> TestResponse {
    app.request(
        Request::builder()
            .method("GET")
            .uri(uri)
            .header("Host", host)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

#[tokio::test]
async fn test_admin_host_redirects_to_dashboard() {
    let app = TestApp::new().await;

    let response = get_on_host(&app, "admin.example.org", "/events/").await;
    assert_eq!(response.status, axum::http::StatusCode::FOUND);
    assert_eq!(response.headers.get("location").unwrap(), "/admin/");

    let response = get_on_host(&app, "admin.example.org", "/").await;
    assert_eq!(response.status, axum::http::StatusCode::FOUND);
}

#[tokio::test]
async fn test_admin_host_dashboard_paths_pass_through() {
    let app = TestApp::new().await;

    // Reaches the staff guard instead of being redirected
    get_on_host(&app, "admin.example.org", "/admin/")
        .await
        .assert_unauthorized();

    let token = app.staff_token().await;
    app.request_with_auth(
        Request::builder()
            .uri("/admin/api/stats/")
            .header("Host", "admin.example.org")
            .body(Body::empty())
            .unwrap(),
        &token,
    )
    .await
    .assert_ok();
}

#[tokio::test]
async fn test_public_host_is_not_redirected() {
    let app = TestApp::new().await;
    get_on_host(&app, "www.example.org", "/events/")
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_empty_prefix_disables_redirect() {
    let mut config = test_config();
    config.routing.admin_host_prefix = String::new();
    let app = TestApp::with_config(config).await;

    get_on_host(&app, "admin.example.org", "/events/")
        .await
        .assert_ok();
}
