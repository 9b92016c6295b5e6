//! Suite contract step definitions

use cucumber::{given, then, when};
use serde_json::{json, Value};

use crate::common::AdminFixtures;
use crate::features::support::TestWorld;

async fn create(world: &mut TestWorld, label: &str, uri: &str, body: Value) {
    let response = world.post(uri, body).await;
    response.assert_created();
    let created: Value = response.json();
    let id = created["id"].as_str().expect("created record has an id").to_string();
    world.ids.insert(label.to_string(), id);
}

#[given(expr = "a suite {string} with an operating model {string}")]
async fn suite_with_model(world: &mut TestWorld, number: String, model: String) {
    create(world, "suite", "/admin/api/suites/", AdminFixtures::suite(&number)).await;
    create(
        world,
        "model",
        "/admin/api/operating-models/",
        AdminFixtures::operating_model(&model),
    )
    .await;
}

#[given(expr = "an individual {string}")]
async fn individual(world: &mut TestWorld, name: String) {
    let (first, last) = name.split_once(' ').unwrap_or((name.as_str(), "Doe"));
    create(
        world,
        "individual",
        "/admin/api/individuals/",
        AdminFixtures::individual(first, last),
    )
    .await;
}

#[given(expr = "an organization {string}")]
async fn organization(world: &mut TestWorld, name: String) {
    create(
        world,
        "organization",
        "/admin/api/organizations/",
        AdminFixtures::organization(&name),
    )
    .await;
}

fn contract(world: &TestWorld, individual: bool, organization: bool) -> Value {
    let mut body = AdminFixtures::contract(
        world.id("suite").parse().expect("suite id"),
        world.id("model").parse().expect("model id"),
        None,
        None,
    );
    if individual {
        body["individual_id"] = json!(world.id("individual"));
    }
    if organization {
        body["organization_id"] = json!(world.id("organization"));
    }
    body
}

#[when(expr = "I create a contract for the individual ending {string}")]
async fn contract_for_individual(world: &mut TestWorld, end: String) {
    let mut body = contract(world, true, false);
    body["end_date"] = json!(end);
    world.post("/admin/api/contracts/", body).await;
}

#[when("I create a contract for both the individual and the organization")]
async fn contract_for_both(world: &mut TestWorld) {
    let body = contract(world, true, true);
    world.post("/admin/api/contracts/", body).await;
}

#[when("I create a contract for nobody")]
async fn contract_for_nobody(world: &mut TestWorld) {
    let body = contract(world, false, false);
    world.post("/admin/api/contracts/", body).await;
}

async fn contract_without_end(world: &mut TestWorld, on_going: bool) {
    let mut body = contract(world, false, true);
    body["end_date"] = Value::Null;
    body["on_going"] = json!(on_going);
    world.post("/admin/api/contracts/", body).await;
}

#[when("I create a contract for the organization without an end date")]
async fn fixed_term_without_end(world: &mut TestWorld) {
    contract_without_end(world, false).await;
}

#[when("I create an ongoing contract for the organization without an end date")]
async fn ongoing_without_end(world: &mut TestWorld) {
    contract_without_end(world, true).await;
}

#[then(expr = "the contract list should show holder {string}")]
async fn contract_list_holder(world: &mut TestWorld, holder: String) {
    let list: Vec<Value> = world.get("/admin/api/contracts/").await.json();
    assert!(
        list.iter().any(|c| c["holder_name"] == holder.as_str()),
        "no contract held by {} in {:?}",
        holder,
        list
    );
}

#[then(expr = "there should be {int} contract(s)")]
async fn contract_count(world: &mut TestWorld, count: usize) {
    let list: Vec<Value> = world.get("/admin/api/contracts/").await.json();
    assert_eq!(list.len(), count);
}
