//! Common step definitions used across features

use cucumber::{given, then};

use crate::features::support::TestWorld;

#[given("I am signed in as staff")]
async fn signed_in_as_staff(world: &mut TestWorld) {
    world.sign_in_as_staff().await;
}

#[given("I am signed in as a member")]
async fn signed_in_as_member(world: &mut TestWorld) {
    world.sign_in_as_member().await;
}

#[given("I am not signed in")]
async fn not_signed_in(world: &mut TestWorld) {
    world.token = None;
}

#[then(expr = "the response status should be {int}")]
async fn response_status(world: &mut TestWorld, status: u16) {
    let response = world.response();
    assert_eq!(
        response.status.as_u16(),
        status,
        "unexpected status, body: {}",
        response.text()
    );
}

#[then("the response should contain an error")]
async fn response_contains_error(world: &mut TestWorld) {
    let body: serde_json::Value = world.response().json();
    assert!(body.get("error").is_some());
}

#[then(expr = "the error message should be {string}")]
async fn error_message(world: &mut TestWorld, message: String) {
    assert_eq!(world.response().error_message(), message);
}
