//! Reservation request step definitions

use cucumber::{given, then, when};
use serde_json::{json, Value};

use crate::common::{ReservationFactory, ReservationFixtures};
use crate::features::support::TestWorld;

#[given("a pending reservation exists")]
async fn pending_reservation(world: &mut TestWorld) {
    let reservation = ReservationFactory::new().create(world.app().await).await;
    world
        .ids
        .insert("reservation".to_string(), reservation.id.to_string());
}

#[when(expr = "a visitor requests a reservation for {string} {int} days from now")]
async fn request_reservation(world: &mut TestWorld, organization: String, days: i64) {
    let mut body = ReservationFixtures::request(days);
    body["organization"] = json!(organization);
    world.token = None;
    let response: Value = world
        .post("/events/reservations/create/", body)
        .await
        .json();
    if let Some(id) = response["id"].as_str() {
        world.ids.insert("reservation".to_string(), id.to_string());
    }
}

#[when(expr = "a visitor requests a reservation with {int} minimum and {int} maximum people")]
async fn request_with_headcount(world: &mut TestWorld, min: i64, max: i64) {
    let mut body = ReservationFixtures::request(5);
    body["min_people"] = json!(min.to_string());
    body["max_people"] = json!(max.to_string());
    world.token = None;
    world.post("/events/reservations/create/", body).await;
}

#[when(expr = "I set the reservation status to {string}")]
async fn set_status(world: &mut TestWorld, status: String) {
    let id = world.id("reservation");
    world
        .post(
            "/admin/api/reservation/status/",
            json!({ "reservation_id": id, "status": status }),
        )
        .await;
}

#[then(expr = "the reservation status should be {string}")]
async fn reservation_status(world: &mut TestWorld, status: String) {
    let body: Value = world.response().json();
    assert_eq!(body["status"], status.as_str());
}

async fn public_reservations(world: &mut TestWorld) -> Vec<Value> {
    world.app().await.get("/events/reservations/").await.json()
}

#[then(expr = "the public reservation list should contain {int} reservation(s)")]
async fn public_list_count(world: &mut TestWorld, count: usize) {
    assert_eq!(public_reservations(world).await.len(), count);
}

#[then("the public reservation list should be empty")]
async fn public_list_empty(world: &mut TestWorld) {
    assert!(public_reservations(world).await.is_empty());
}
