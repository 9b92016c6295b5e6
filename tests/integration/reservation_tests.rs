//! Reservation request and review tests

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use suitehub::{db::ReservationRepository, models::ReservationStatus};

use crate::common::{
    ids::UNKNOWN_ID, ReservationFactory, ReservationFixtures, TestApp, VenueFactory,
};

#[tokio::test]
async fn test_request_is_stored_as_pending() {
    let app = TestApp::new().await;
    let venue = VenueFactory::create(&app).await;

    let response = app
        .post_json(
            "/events/reservations/create/",
            ReservationFixtures::for_venue(venue.id, 5),
        )
        .await;
    response.assert_created();

    let json: Value = response.json();
    assert_eq!(json["status"], "pending");
    assert_eq!(json["organization"], "Riverside Makers");
    assert_eq!(json["duration_hours"], 2.5);
    assert_eq!(json["min_people"], 10);
    assert_eq!(json["venue_name"], venue.name.as_str());
    assert!(json["end_datetime"].is_string());
}

#[tokio::test]
async fn test_inverted_headcount_rejected_and_nothing_stored() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/events/reservations/create/",
            ReservationFixtures::inverted_headcount(),
        )
        .await;
    response.assert_bad_request();
    assert_eq!(
        response.error_message(),
        "Minimum people cannot exceed maximum people"
    );

    let stored = ReservationRepository::new(&app.state.db)
        .list_recent(10)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_unparseable_fields_rejected() {
    let app = TestApp::new().await;

    let mut body = ReservationFixtures::request(3);
    body["start_datetime"] = json!("next tuesday");
    let response = app.post_json("/events/reservations/create/", body).await;
    response.assert_bad_request();
    assert!(response.error_message().starts_with("Invalid start date/time"));

    let mut body = ReservationFixtures::request(3);
    body["duration_hours"] = json!("0");
    app.post_json("/events/reservations/create/", body)
        .await
        .assert_bad_request();

    let mut body = ReservationFixtures::request(3);
    body["organization"] = json!("   ");
    let response = app.post_json("/events/reservations/create/", body).await;
    response.assert_bad_request();
    assert_eq!(
        response.error_message(),
        "Missing required field: organization"
    );
}

#[tokio::test]
async fn test_out_of_range_duration_rejected_and_staff_list_still_loads() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;

    for duration in [json!("1e12"), json!(1e12), json!("9000")] {
        let mut body = ReservationFixtures::request(3);
        body["duration_hours"] = duration;
        let response = app.post_json("/events/reservations/create/", body).await;
        response.assert_bad_request();
        assert!(response.error_message().starts_with("Duration cannot exceed"));
    }

    let stored = ReservationRepository::new(&app.state.db)
        .list_recent(10)
        .await
        .unwrap();
    assert!(stored.is_empty());

    app.get_with_auth("/admin/api/reservations/", &token)
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_numeric_fields_accept_json_numbers() {
    let app = TestApp::new().await;

    let mut body = ReservationFixtures::request(3);
    body["duration_hours"] = json!(3);
    body["max_people"] = json!(25);
    let response = app.post_json("/events/reservations/create/", body).await;
    response.assert_created();
    let json: Value = response.json();
    assert_eq!(json["max_people"], 25);
}

#[tokio::test]
async fn test_unknown_venue_rejected() {
    let app = TestApp::new().await;
    app.post_json(
        "/events/reservations/create/",
        ReservationFixtures::for_venue(UNKNOWN_ID, 3),
    )
    .await
    .assert_bad_request();
}

#[tokio::test]
async fn test_public_list_shows_only_upcoming_approved() {
    let app = TestApp::new().await;

    let visible = ReservationFactory::new()
        .with_status(ReservationStatus::Approved)
        .create(&app)
        .await;
    ReservationFactory::new().create(&app).await;
    ReservationFactory::new()
        .with_status(ReservationStatus::Rejected)
        .create(&app)
        .await;
    ReservationFactory::new()
        .with_status(ReservationStatus::Approved)
        .starting(Utc::now() - Duration::days(2))
        .create(&app)
        .await;

    let response = app.get("/events/reservations/").await;
    response.assert_ok();
    let list: Vec<Value> = response.json();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], visible.id.to_string());
}

#[tokio::test]
async fn test_public_list_ordered_by_start() {
    let app = TestApp::new().await;

    let later = ReservationFactory::new()
        .with_status(ReservationStatus::Approved)
        .starting(Utc::now() + Duration::days(10))
        .create(&app)
        .await;
    let sooner = ReservationFactory::new()
        .with_status(ReservationStatus::Approved)
        .starting(Utc::now() + Duration::days(1))
        .create(&app)
        .await;

    let list: Vec<Value> = app.get("/events/reservations/").await.json();
    let ids: Vec<String> = list
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec![sooner.id.to_string(), later.id.to_string()]);
}

#[tokio::test]
async fn test_public_detail_hides_unapproved() {
    let app = TestApp::new().await;
    let pending = ReservationFactory::new().create(&app).await;
    let approved = ReservationFactory::new()
        .with_status(ReservationStatus::Approved)
        .create(&app)
        .await;

    app.get(&format!("/events/reservations/{}/", pending.id))
        .await
        .assert_not_found();
    app.get("/events/reservations/garbage/")
        .await
        .assert_not_found();

    let response = app
        .get(&format!("/events/reservations/{}/", approved.id))
        .await;
    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "approved");
}

#[tokio::test]
async fn test_staff_approves_request() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let reservation = ReservationFactory::new().create(&app).await;

    let response = app
        .post_json_with_auth(
            "/admin/api/reservation/status/",
            json!({ "reservation_id": reservation.id.to_string(), "status": "approved" }),
            &token,
        )
        .await;
    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["success"], true);
    assert_eq!(json["status"], "approved");

    app.get(&format!("/events/reservations/{}/", reservation.id))
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_status_can_move_back_to_pending() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let reservation = ReservationFactory::new()
        .with_status(ReservationStatus::Cancelled)
        .create(&app)
        .await;

    app.post_json_with_auth(
        "/admin/api/reservation/status/",
        json!({ "reservation_id": reservation.id.to_string(), "status": "pending" }),
        &token,
    )
    .await
    .assert_ok();

    let (stored, _) = ReservationRepository::new(&app.state.db)
        .get_by_id(reservation.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ReservationStatus::Pending);
}

#[tokio::test]
async fn test_status_update_errors() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let reservation = ReservationFactory::new().create(&app).await;

    let response = app
        .post_json_with_auth(
            "/admin/api/reservation/status/",
            json!({ "status": "approved" }),
            &token,
        )
        .await;
    response.assert_bad_request();
    assert_eq!(response.error_message(), "Missing required fields");

    app.post_json_with_auth(
        "/admin/api/reservation/status/",
        json!({ "reservation_id": reservation.id.to_string(), "status": "maybe" }),
        &token,
    )
    .await
    .assert_bad_request();

    let response = app
        .post_json_with_auth(
            "/admin/api/reservation/status/",
            json!({ "reservation_id": UNKNOWN_ID.to_string(), "status": "approved" }),
            &token,
        )
        .await;
    response.assert_not_found();
    assert_eq!(response.error_message(), "Reservation not found");

    // Wrongly typed fields are rejected in the same envelope
    let response = app
        .post_json_with_auth(
            "/admin/api/reservation/status/",
            json!({ "reservation_id": 42, "status": "approved" }),
            &token,
        )
        .await;
    response.assert_bad_request();
    assert!(!response.error_message().is_empty());
}

#[tokio::test]
async fn test_status_update_is_staff_only() {
    let app = TestApp::new().await;
    let (_, token) = app.user_with_token().await;
    let reservation = ReservationFactory::new().create(&app).await;

    app.post_json_with_auth(
        "/admin/api/reservation/status/",
        json!({ "reservation_id": reservation.id.to_string(), "status": "approved" }),
        &token,
    )
    .await
    .assert_forbidden();
}

#[tokio::test]
async fn test_staff_review_list_includes_every_status() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let venue = VenueFactory::create(&app).await;

    ReservationFactory::new().at_venue(venue.id).create(&app).await;
    ReservationFactory::new()
        .with_status(ReservationStatus::Rejected)
        .create(&app)
        .await;

    let response = app.get_with_auth("/admin/api/reservations/", &token).await;
    response.assert_ok();
    let list: Vec<Value> = response.json();
    assert_eq!(list.len(), 2);
    assert!(list.iter().any(|r| r["venue"] == venue.name.as_str()));
}
