//! Suite, operating model and contract tests

use serde_json::{json, Value};

use crate::common::{ids::UNKNOWN_ID, AdminFixtures, TestApp};

/// Staff token plus a suite, a model and one entity of each kind
struct ContractSetup {
    token: String,
    suite_id: String,
    model_id: String,
    individual_id: String,
    organization_id: String,
}

async fn setup(app: &TestApp) -> ContractSetup {
    let token = app.staff_token().await;

    let id_of = |response: crate::common::TestResponse| -> String {
        response.assert_created();
        let json: Value = response.json();
        json["id"].as_str().unwrap().to_string()
    };

    let suite_id = id_of(
        app.post_json_with_auth("/admin/api/suites/", AdminFixtures::suite("101"), &token)
            .await,
    );
    let model_id = id_of(
        app.post_json_with_auth(
            "/admin/api/operating-models/",
            AdminFixtures::operating_model("Standard"),
            &token,
        )
        .await,
    );
    let individual_id = id_of(
        app.post_json_with_auth(
            "/admin/api/individuals/",
            AdminFixtures::individual("Rosa", "Tenant"),
            &token,
        )
        .await,
    );
    let organization_id = id_of(
        app.post_json_with_auth(
            "/admin/api/organizations/",
            AdminFixtures::organization("Lantern Press"),
            &token,
        )
        .await,
    );

    ContractSetup {
        token,
        suite_id,
        model_id,
        individual_id,
        organization_id,
    }
}

fn contract_body(
    setup: &ContractSetup,
    individual: bool,
    organization: bool,
) -> Value {
    json!({
        "suite_id": setup.suite_id,
        "model_id": setup.model_id,
        "individual_id": if individual { json!(setup.individual_id) } else { Value::Null },
        "organization_id": if organization { json!(setup.organization_id) } else { Value::Null },
        "begin_date": "2025-01-01",
        "end_date": "2025-12-31",
        "on_going": false
    })
}

async fn contract_count(app: &TestApp, token: &str) -> usize {
    let list: Vec<Value> = app.get_with_auth("/admin/api/contracts/", token).await.json();
    list.len()
}

#[tokio::test]
async fn test_malformed_contract_fields_get_error_envelope() {
    let app = TestApp::new().await;
    let setup = setup(&app).await;

    let mut body = contract_body(&setup, true, false);
    body["begin_date"] = json!("not-a-date");
    let response = app
        .post_json_with_auth("/admin/api/contracts/", body, &setup.token)
        .await;
    response.assert_bad_request();
    assert!(response.error_message().contains("begin_date"));

    let mut body = contract_body(&setup, true, false);
    body["suite_id"] = json!("suite-101");
    app.post_json_with_auth("/admin/api/contracts/", body, &setup.token)
        .await
        .assert_bad_request();

    assert_eq!(contract_count(&app, &setup.token).await, 0);
}

#[tokio::test]
async fn test_operating_model_defaults() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;

    let response = app
        .post_json_with_auth(
            "/admin/api/operating-models/",
            json!({ "name": "Hot desk", "is_shared": true }),
            &token,
        )
        .await;
    response.assert_created();
    let model: Value = response.json();
    assert_eq!(model["price_cents"], 300_000);
    assert_eq!(model["period_days"], 180);
    assert_eq!(model["is_shared"], true);
}

#[tokio::test]
async fn test_contract_with_individual_holder() {
    let app = TestApp::new().await;
    let setup = setup(&app).await;

    let response = app
        .post_json_with_auth(
            "/admin/api/contracts/",
            contract_body(&setup, true, false),
            &setup.token,
        )
        .await;
    response.assert_created();
    let contract: Value = response.json();
    assert_eq!(contract["holder"]["kind"], "individual");
    assert_eq!(contract["holder"]["id"], setup.individual_id.as_str());

    let list: Vec<Value> = app
        .get_with_auth("/admin/api/contracts/", &setup.token)
        .await
        .json();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["holder_name"], "Rosa Tenant");
    assert_eq!(list[0]["suite_number"], "101");
    assert_eq!(list[0]["model_name"], "Standard");
}

#[tokio::test]
async fn test_contract_with_organization_holder() {
    let app = TestApp::new().await;
    let setup = setup(&app).await;

    app.post_json_with_auth(
        "/admin/api/contracts/",
        contract_body(&setup, false, true),
        &setup.token,
    )
    .await
    .assert_created();

    let list: Vec<Value> = app
        .get_with_auth("/admin/api/contracts/", &setup.token)
        .await
        .json();
    assert_eq!(list[0]["holder"]["kind"], "organization");
    assert_eq!(list[0]["holder_name"], "Lantern Press");
}

#[tokio::test]
async fn test_contract_holder_must_be_exactly_one() {
    let app = TestApp::new().await;
    let setup = setup(&app).await;

    let response = app
        .post_json_with_auth(
            "/admin/api/contracts/",
            contract_body(&setup, true, true),
            &setup.token,
        )
        .await;
    response.assert_bad_request();
    assert_eq!(
        response.error_message(),
        "You cannot select both an individual and an organization. Choose one."
    );

    let response = app
        .post_json_with_auth(
            "/admin/api/contracts/",
            contract_body(&setup, false, false),
            &setup.token,
        )
        .await;
    response.assert_bad_request();
    assert_eq!(
        response.error_message(),
        "You must select either an individual or an organization."
    );

    assert_eq!(contract_count(&app, &setup.token).await, 0);
}

#[tokio::test]
async fn test_contract_date_rules() {
    let app = TestApp::new().await;
    let setup = setup(&app).await;

    let mut body = contract_body(&setup, true, false);
    body["end_date"] = Value::Null;
    let response = app
        .post_json_with_auth("/admin/api/contracts/", body.clone(), &setup.token)
        .await;
    response.assert_bad_request();
    assert_eq!(
        response.error_message(),
        "End date is required unless the contract is ongoing."
    );

    body["on_going"] = json!(true);
    app.post_json_with_auth("/admin/api/contracts/", body, &setup.token)
        .await
        .assert_created();

    let mut body = contract_body(&setup, true, false);
    body["end_date"] = json!("2024-06-30");
    let response = app
        .post_json_with_auth("/admin/api/contracts/", body, &setup.token)
        .await;
    response.assert_bad_request();
    assert_eq!(response.error_message(), "End date must be after start date.");

    assert_eq!(contract_count(&app, &setup.token).await, 1);
}

#[tokio::test]
async fn test_contract_for_missing_suite_rejected() {
    let app = TestApp::new().await;
    let setup = setup(&app).await;

    let mut body = contract_body(&setup, true, false);
    body["suite_id"] = json!(UNKNOWN_ID);
    app.post_json_with_auth("/admin/api/contracts/", body, &setup.token)
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_contract_update_switches_holder() {
    let app = TestApp::new().await;
    let setup = setup(&app).await;

    let created: Value = app
        .post_json_with_auth(
            "/admin/api/contracts/",
            contract_body(&setup, true, false),
            &setup.token,
        )
        .await
        .json();
    let uri = format!("/admin/api/contracts/{}/", created["id"].as_str().unwrap());

    let response = app
        .put_json_with_auth(&uri, contract_body(&setup, false, true), &setup.token)
        .await;
    response.assert_ok();
    let updated: Value = response.json();
    assert_eq!(updated["holder"]["kind"], "organization");

    app.put_json_with_auth(&uri, contract_body(&setup, true, true), &setup.token)
        .await
        .assert_bad_request();

    app.delete_with_auth(&uri, &setup.token)
        .await
        .assert_no_content();
    app.get_with_auth(&uri, &setup.token)
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_deleting_suite_removes_its_contracts() {
    let app = TestApp::new().await;
    let setup = setup(&app).await;

    let created: Value = app
        .post_json_with_auth(
            "/admin/api/contracts/",
            contract_body(&setup, true, false),
            &setup.token,
        )
        .await
        .json();

    let suites: Vec<Value> = app
        .get_with_auth("/admin/api/suites/", &setup.token)
        .await
        .json();
    assert_eq!(suites[0]["contracts_count"], 1);

    app.delete_with_auth(
        &format!("/admin/api/suites/{}/", setup.suite_id),
        &setup.token,
    )
    .await
    .assert_no_content();

    app.get_with_auth(
        &format!("/admin/api/contracts/{}/", created["id"].as_str().unwrap()),
        &setup.token,
    )
    .await
    .assert_not_found();
}

#[tokio::test]
async fn test_deleting_model_removes_its_contracts() {
    let app = TestApp::new().await;
    let setup = setup(&app).await;

    app.post_json_with_auth(
        "/admin/api/contracts/",
        contract_body(&setup, false, true),
        &setup.token,
    )
    .await
    .assert_created();

    app.delete_with_auth(
        &format!("/admin/api/operating-models/{}/", setup.model_id),
        &setup.token,
    )
    .await
    .assert_no_content();

    assert_eq!(contract_count(&app, &setup.token).await, 0);
}

#[tokio::test]
async fn test_suite_update_and_validation() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;

    let suite: Value = app
        .post_json_with_auth("/admin/api/suites/", AdminFixtures::suite("2B"), &token)
        .await
        .json();
    let uri = format!("/admin/api/suites/{}/", suite["id"].as_str().unwrap());

    let mut body = AdminFixtures::suite("2B");
    body["minifridge"] = json!(true);
    let updated: Value = app.put_json_with_auth(&uri, body, &token).await.json();
    assert_eq!(updated["minifridge"], true);

    let mut body = AdminFixtures::suite("2B");
    body["office_chairs"] = json!(-1);
    app.put_json_with_auth(&uri, body, &token)
        .await
        .assert_bad_request();

    let detail: Value = app.get_with_auth(&uri, &token).await.json();
    assert_eq!(detail["suite_number"], "2B");
    assert!(detail["floor_plan"].is_null());
}
