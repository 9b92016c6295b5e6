//! Staff dashboard tests

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use suitehub::models::{EventStatus, ReservationStatus};

use crate::common::{AdminFixtures, EventFactory, ReservationFactory, TestApp, VenueFactory};

#[tokio::test]
async fn test_stats_on_empty_database() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;

    let response = app.get_with_auth("/admin/api/stats/", &token).await;
    response.assert_ok();
    let stats: Value = response.json();
    assert_eq!(stats["reservations"]["total"], 0);
    assert_eq!(stats["events"]["total"], 0);
    assert_eq!(stats["venues"]["total"], 0);
    assert_eq!(stats["suites"]["contracts"], 0);
    assert_eq!(stats["entities"]["individuals"], 0);
}

#[tokio::test]
async fn test_stats_count_current_state() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;

    let venue = VenueFactory::create(&app).await;
    VenueFactory::create(&app).await;

    ReservationFactory::new().at_venue(venue.id).create(&app).await;
    ReservationFactory::new()
        .with_status(ReservationStatus::Approved)
        .create(&app)
        .await;
    ReservationFactory::new()
        .with_status(ReservationStatus::Approved)
        .starting(Utc::now() - Duration::days(30))
        .create(&app)
        .await;
    ReservationFactory::new()
        .with_status(ReservationStatus::Cancelled)
        .create(&app)
        .await;

    EventFactory::new().create(&app).await;
    EventFactory::new()
        .with_status(EventStatus::Canceled)
        .inactive()
        .create(&app)
        .await;

    let stats: Value = app.get_with_auth("/admin/api/stats/", &token).await.json();

    assert_eq!(stats["reservations"]["total"], 4);
    assert_eq!(stats["reservations"]["pending"], 1);
    assert_eq!(stats["reservations"]["approved"], 2);
    assert_eq!(stats["reservations"]["rejected"], 0);
    assert_eq!(stats["reservations"]["cancelled"], 1);
    // All four were created just now
    assert_eq!(stats["reservations"]["recent"], 4);

    assert_eq!(stats["events"]["total"], 2);
    assert_eq!(stats["events"]["active"], 1);

    assert_eq!(stats["venues"]["total"], 2);
    assert_eq!(stats["venues"]["with_reservations"], 1);
}

#[tokio::test]
async fn test_stats_track_suites_and_contracts() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;

    let suite: Value = app
        .post_json_with_auth("/admin/api/suites/", AdminFixtures::suite("7"), &token)
        .await
        .json();
    let model: Value = app
        .post_json_with_auth(
            "/admin/api/operating-models/",
            AdminFixtures::operating_model("Monthly"),
            &token,
        )
        .await
        .json();
    let org: Value = app
        .post_json_with_auth(
            "/admin/api/organizations/",
            AdminFixtures::organization("Quill"),
            &token,
        )
        .await
        .json();

    // Ongoing since 2020, active today
    app.post_json_with_auth(
        "/admin/api/contracts/",
        json!({
            "suite_id": suite["id"],
            "model_id": model["id"],
            "organization_id": org["id"],
            "begin_date": "2020-01-01",
            "on_going": true
        }),
        &token,
    )
    .await
    .assert_created();

    // Ended long ago
    app.post_json_with_auth(
        "/admin/api/contracts/",
        json!({
            "suite_id": suite["id"],
            "model_id": model["id"],
            "organization_id": org["id"],
            "begin_date": "2019-01-01",
            "end_date": "2019-06-30"
        }),
        &token,
    )
    .await
    .assert_created();

    let stats: Value = app.get_with_auth("/admin/api/stats/", &token).await.json();
    assert_eq!(stats["suites"]["total"], 1);
    assert_eq!(stats["suites"]["contracts"], 2);
    assert_eq!(stats["suites"]["active_contracts"], 1);
    assert_eq!(stats["entities"]["organizations"], 1);
}

#[tokio::test]
async fn test_dashboard_index_names_the_caller() {
    let app = TestApp::new().await;
    let staff = app.create_user("frontdesk", true).await;
    let token = app.token_for(&staff);

    let response = app.get_with_auth("/admin/", &token).await;
    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["user"], "frontdesk");
    let endpoints = json["endpoints"].as_array().unwrap();
    assert!(endpoints.iter().any(|e| e == "/admin/api/stats/"));
}

#[tokio::test]
async fn test_recent_events_list_includes_pending() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;

    EventFactory::new()
        .with_status(EventStatus::Pending)
        .create(&app)
        .await;

    let list: Vec<Value> = app.get_with_auth("/admin/api/events/", &token).await.json();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["status"], "pending");
}
