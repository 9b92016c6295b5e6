//! Event listing, registration and booking API tests

use chrono::{Duration, Utc};
use rstest::rstest;
use serde_json::{json, Value};

use std::sync::Arc;

use axum::http::StatusCode;
use tokio::task::JoinSet;

use suitehub::{db::EventRepository, models::EventStatus};

use crate::common::{ids::UNKNOWN_ID, test_config, AdminFixtures, EventFactory, TestApp};

async fn create_class(app: &TestApp, token: &str, name: &str) -> Value {
    let response = app
        .post_json_with_auth(
            "/admin/api/event-classes/",
            json!({ "name": name, "description": "Test class" }),
            token,
        )
        .await;
    response.assert_created();
    response.json()
}

#[tokio::test]
async fn test_listing_shows_only_open_upcoming_events() {
    let app = TestApp::new().await;

    let open = EventFactory::new().create(&app).await;
    EventFactory::new()
        .with_status(EventStatus::Pending)
        .create(&app)
        .await;
    EventFactory::new().inactive().create(&app).await;
    EventFactory::new()
        .on(Utc::now() - Duration::days(1))
        .create(&app)
        .await;

    let response = app.get("/events/").await;
    response.assert_ok();
    let list: Vec<Value> = response.json();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], open.id.to_string());
    assert_eq!(list[0]["registration_count"], 0);
}

#[tokio::test]
async fn test_listing_search_matches_title() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;

    app.post_json_with_auth(
        "/admin/api/events/",
        AdminFixtures::event("Pottery Night", None),
        &token,
    )
    .await
    .assert_created();
    app.post_json_with_auth(
        "/admin/api/events/",
        AdminFixtures::event("Board Games", None),
        &token,
    )
    .await
    .assert_created();

    let list: Vec<Value> = app.get("/events/?search=pottery").await.json();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["title"], "Pottery Night");
}

#[tokio::test]
async fn test_detail_is_personalised() {
    let app = TestApp::new().await;
    let event = EventFactory::new().with_capacity(10).create(&app).await;
    let (_, token) = app.user_with_token().await;

    let anonymous: Value = app.get(&format!("/events/{}/", event.id)).await.json();
    assert_eq!(anonymous["user_registered"], false);
    assert_eq!(anonymous["can_register"], true);
    assert_eq!(anonymous["spots_remaining"], 10);

    app.post_json_with_auth(
        &format!("/events/{}/register/", event.id),
        json!({ "notes": "Bringing a friend" }),
        &token,
    )
    .await
    .assert_created();

    let mine: Value = app
        .get_with_auth(&format!("/events/{}/", event.id), &token)
        .await
        .json();
    assert_eq!(mine["user_registered"], true);
    assert_eq!(mine["registration_count"], 1);
    assert_eq!(mine["spots_remaining"], 9);
}

#[tokio::test]
async fn test_detail_of_unknown_event() {
    let app = TestApp::new().await;
    app.get(&format!("/events/{}/", UNKNOWN_ID))
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_register_requires_sign_in() {
    let app = TestApp::new().await;
    let event = EventFactory::new().create(&app).await;

    app.post_json(&format!("/events/{}/register/", event.id), json!({}))
        .await
        .assert_unauthorized();
}

#[tokio::test]
async fn test_double_registration_conflicts() {
    let app = TestApp::new().await;
    let event = EventFactory::new().create(&app).await;
    let (_, token) = app.user_with_token().await;
    let uri = format!("/events/{}/register/", event.id);

    app.post_json_with_auth(&uri, json!({}), &token)
        .await
        .assert_created();
    let response = app.post_json_with_auth(&uri, json!({}), &token).await;
    response.assert_conflict();
    assert_eq!(
        response.error_message(),
        "You are already registered for this event"
    );
}

#[tokio::test]
async fn test_full_event_rejects_registration() {
    let app = TestApp::new().await;
    let event = EventFactory::new().with_capacity(1).create(&app).await;
    let (_, first) = app.user_with_token().await;
    let (_, second) = app.user_with_token().await;
    let uri = format!("/events/{}/register/", event.id);

    app.post_json_with_auth(&uri, json!({}), &first)
        .await
        .assert_created();
    let response = app.post_json_with_auth(&uri, json!({}), &second).await;
    response.assert_bad_request();
    assert_eq!(response.error_message(), "This event is full");
}

#[tokio::test]
async fn test_registered_user_on_full_event_gets_conflict() {
    let app = TestApp::new().await;
    let event = EventFactory::new().with_capacity(1).create(&app).await;
    let (_, token) = app.user_with_token().await;
    let uri = format!("/events/{}/register/", event.id);

    app.post_json_with_auth(&uri, json!({}), &token)
        .await
        .assert_created();

    // Full now, but the duplicate is what the caller needs to hear about
    let response = app.post_json_with_auth(&uri, json!({}), &token).await;
    response.assert_conflict();
    assert_eq!(
        response.error_message(),
        "You are already registered for this event"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_never_exceed_capacity() {
    const CAPACITY: i64 = 3;
    const ATTEMPTS: usize = 20;

    let mut config = test_config();
    config.database.max_connections = 8;
    let app = Arc::new(TestApp::with_config(config).await);
    let event = EventFactory::new()
        .with_capacity(CAPACITY)
        .create(&app)
        .await;
    let uri = format!("/events/{}/register/", event.id);

    let mut tokens = Vec::with_capacity(ATTEMPTS);
    for _ in 0..ATTEMPTS {
        let (_, token) = app.user_with_token().await;
        tokens.push(token);
    }

    let mut attempts = JoinSet::new();
    for token in tokens {
        let app = Arc::clone(&app);
        let uri = uri.clone();
        attempts.spawn(async move {
            app.post_json_with_auth(&uri, json!({}), &token)
                .await
                .status
        });
    }

    let mut created = 0;
    while let Some(status) = attempts.join_next().await {
        match status.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::BAD_REQUEST => {}
            other => panic!("Unexpected registration status {}", other),
        }
    }

    assert_eq!(created, CAPACITY);
    let stored = EventRepository::new(&app.state.db)
        .registration_count(event.id)
        .await
        .unwrap();
    assert_eq!(stored, CAPACITY);
}

#[tokio::test]
async fn test_pending_event_not_open_for_registration() {
    let app = TestApp::new().await;
    let event = EventFactory::new()
        .with_status(EventStatus::Pending)
        .create(&app)
        .await;
    let (_, token) = app.user_with_token().await;

    let response = app
        .post_json_with_auth(&format!("/events/{}/register/", event.id), json!({}), &token)
        .await;
    response.assert_bad_request();
    assert_eq!(
        response.error_message(),
        "Registration is not open for this event"
    );
}

#[tokio::test]
async fn test_unregister_and_my_events() {
    let app = TestApp::new().await;
    let event = EventFactory::new().create(&app).await;
    let (_, token) = app.user_with_token().await;

    app.post_json_with_auth(
        &format!("/events/{}/register/", event.id),
        json!({ "notes": "vegetarian" }),
        &token,
    )
    .await
    .assert_created();

    let mine: Vec<Value> = app.get_with_auth("/events/my-events/", &token).await.json();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["event_id"], event.id.to_string());
    assert_eq!(mine[0]["notes"], "vegetarian");

    let uri = format!("/events/{}/unregister/", event.id);
    app.post_json_with_auth(&uri, json!({}), &token)
        .await
        .assert_no_content();
    app.post_json_with_auth(&uri, json!({}), &token)
        .await
        .assert_not_found();

    let mine: Vec<Value> = app.get_with_auth("/events/my-events/", &token).await.json();
    assert!(mine.is_empty());
}

#[rstest]
#[case("intimate", 1, 10)]
#[case("large", 31, 60)]
#[case("massive", 121, 500)]
#[case("unknown", 1, 1)]
#[case("stadium", 1, 1)]
#[tokio::test]
async fn test_create_event_api_maps_crowd_size(
    #[case] crowd_size: &str,
    #[case] min: i64,
    #[case] max: i64,
) {
    let app = TestApp::new().await;
    let staff = app.staff_token().await;
    create_class(&app, &staff, "Workshop").await;
    let (user, token) = app.user_with_token().await;

    let response = app
        .post_json_with_auth(
            "/events/api/create-event/",
            json!({
                "title": "Soldering 101",
                "eventType": "workshop",
                "datetimeStart": (Utc::now() + Duration::days(20)).format("%Y-%m-%dT%H:%M").to_string(),
                "area": "Lab",
                "crowdSize": crowd_size
            }),
            &token,
        )
        .await;
    response.assert_created();
    let json: Value = response.json();
    assert_eq!(json["success"], true);

    let event_id = json["event_id"].as_str().unwrap();
    let detail: Value = app
        .get_with_auth(&format!("/admin/api/events/{}/", event_id), &staff)
        .await
        .json();
    assert_eq!(detail["min_participants"], min);
    assert_eq!(detail["max_participants"], max);
    assert_eq!(detail["status"], "pending");
    assert_eq!(detail["organizer_id"], user.id.to_string());
    assert_eq!(detail["event_class_name"], "Workshop");
}

#[tokio::test]
async fn test_create_event_api_validation() {
    let app = TestApp::new().await;
    let (_, token) = app.user_with_token().await;

    let response = app
        .post_json_with_auth(
            "/events/api/create-event/",
            json!({ "title": "No date", "eventType": "Workshop" }),
            &token,
        )
        .await;
    response.assert_bad_request();
    assert_eq!(
        response.error_message(),
        "Missing required fields: title, eventType, datetimeStart"
    );

    let response = app
        .post_json_with_auth(
            "/events/api/create-event/",
            json!({
                "title": "Mystery",
                "eventType": "Seance",
                "datetimeStart": "2030-01-01T19:00"
            }),
            &token,
        )
        .await;
    response.assert_bad_request();
    assert_eq!(response.error_message(), "Unknown event type: Seance");
}

#[tokio::test]
async fn test_staff_event_status_update() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let event = EventFactory::new()
        .with_status(EventStatus::Pending)
        .create(&app)
        .await;

    let response = app
        .post_json_with_auth(
            "/admin/api/event/status/",
            json!({ "event_id": event.id, "status": "approved" }),
            &token,
        )
        .await;
    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "approved");

    let list: Vec<Value> = app.get("/events/").await.json();
    assert_eq!(list.len(), 1);

    app.post_json_with_auth(
        "/admin/api/event/status/",
        json!({ "event_id": event.id, "status": "bogus" }),
        &token,
    )
    .await
    .assert_bad_request();
    app.post_json_with_auth(
        "/admin/api/event/status/",
        json!({ "event_id": UNKNOWN_ID, "status": "canceled" }),
        &token,
    )
    .await
    .assert_not_found();
}

#[tokio::test]
async fn test_staff_event_bounds_checked() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;

    let mut body = AdminFixtures::event("Lopsided", Some(5));
    body["min_participants"] = json!(10);
    app.post_json_with_auth("/admin/api/events/", body, &token)
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_event_class_lifecycle() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let class = create_class(&app, &token, "Lecture").await;
    let id = class["id"].as_str().unwrap().to_string();

    let mut event = AdminFixtures::event("Guest talk", None);
    event["event_class_id"] = json!(id);
    let event: Value = app
        .post_json_with_auth("/admin/api/events/", event, &token)
        .await
        .json();

    let response = app
        .put_json_with_auth(
            &format!("/admin/api/event-classes/{}/", id),
            json!({ "name": "Talk", "is_active": false }),
            &token,
        )
        .await;
    response.assert_ok();
    let updated: Value = response.json();
    assert_eq!(updated["name"], "Talk");
    assert_eq!(updated["is_active"], false);

    let detail: Value = app
        .get_with_auth(&format!("/admin/api/event-classes/{}/", id), &token)
        .await
        .json();
    assert_eq!(detail["photos"], json!([]));

    app.delete_with_auth(&format!("/admin/api/event-classes/{}/", id), &token)
        .await
        .assert_no_content();

    // Events outlive their class
    let detail: Value = app
        .get(&format!("/events/{}/", event["id"].as_str().unwrap()))
        .await
        .json();
    assert!(detail["event_class_id"].is_null());
}
