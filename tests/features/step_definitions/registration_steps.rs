//! Event registration step definitions

use cucumber::{given, then, when};
use serde_json::{json, Value};

use crate::common::EventFactory;
use crate::features::support::TestWorld;

#[given(regex = r"^an open event with room for (\d+) participants?$")]
async fn open_event(world: &mut TestWorld, capacity: i64) {
    let event = EventFactory::new()
        .with_capacity(capacity)
        .create(world.app().await)
        .await;
    world.ids.insert("event".to_string(), event.id.to_string());
}

#[given("another member has registered for the event")]
async fn another_member_registered(world: &mut TestWorld) {
    let event_id = world.id("event");
    let app = world.app().await;
    let (_, token) = app.user_with_token().await;
    app.post_json_with_auth(&format!("/events/{}/register/", event_id), json!({}), &token)
        .await
        .assert_created();
}

async fn register_current_actor(world: &mut TestWorld) {
    let event_id = world.id("event");
    world
        .post(&format!("/events/{}/register/", event_id), json!({}))
        .await;
}

#[given("I have registered for the event")]
async fn registered_already(world: &mut TestWorld) {
    register_current_actor(world).await;
    world.response().assert_created();
}

#[when("I register for the event")]
async fn register(world: &mut TestWorld) {
    register_current_actor(world).await;
}

#[then(expr = "the event should have {int} registration(s)")]
async fn registration_count(world: &mut TestWorld, count: i64) {
    let event_id = world.id("event");
    let detail: Value = world.get(&format!("/events/{}/", event_id)).await.json();
    assert_eq!(detail["registration_count"], count);
}
