//! Photo, logo and floor plan upload tests

use std::path::Path;

use axum::{body::Body, http::Request};
use serde_json::Value;

use crate::common::{ids::UNKNOWN_ID, AdminFixtures, TestApp};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot really an image";

fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

async fn create_venue(app: &TestApp, token: &str) -> String {
    let venue: Value = app
        .post_json_with_auth("/admin/api/venues/", AdminFixtures::venue("Gallery", 60), token)
        .await
        .json();
    venue["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_venue_photo_upload_and_delete() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let venue_id = create_venue(&app, &token).await;

    let response = app
        .upload_with_auth(
            &format!("/admin/api/venues/{}/photos/", venue_id),
            "front view.png",
            PNG_BYTES,
            Some("Front entrance"),
            &token,
        )
        .await;
    response.assert_created();
    let photo: Value = response.json();
    assert_eq!(photo["caption"], "Front entrance");
    let path = photo["path"].as_str().unwrap();
    assert!(path.starts_with("venue_photos/"));

    let stored = app.media_root().join(path);
    assert_eq!(std::fs::read(&stored).unwrap(), PNG_BYTES);

    let detail: Value = app
        .get_with_auth(&format!("/admin/api/venues/{}/", venue_id), &token)
        .await
        .json();
    assert_eq!(detail["photos"].as_array().unwrap().len(), 1);

    app.delete_with_auth(
        &format!(
            "/admin/api/venues/{}/photos/{}/",
            venue_id,
            photo["id"].as_str().unwrap()
        ),
        &token,
    )
    .await
    .assert_no_content();
    assert!(!stored.exists());
}

#[tokio::test]
async fn test_venue_photo_limit() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let venue_id = create_venue(&app, &token).await;
    let uri = format!("/admin/api/venues/{}/photos/", venue_id);

    for i in 0..6 {
        app.upload_with_auth(&uri, &format!("{}.png", i), PNG_BYTES, None, &token)
            .await
            .assert_created();
    }

    let response = app
        .upload_with_auth(&uri, "seventh.png", PNG_BYTES, None, &token)
        .await;
    response.assert_bad_request();
    assert_eq!(response.error_message(), "Venue photos are limited to 6");
    assert_eq!(count_files(&app.media_root()), 6);
}

#[tokio::test]
async fn test_event_class_photo_limit_is_two() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let class: Value = app
        .post_json_with_auth(
            "/admin/api/event-classes/",
            serde_json::json!({ "name": "Gala" }),
            &token,
        )
        .await
        .json();
    let uri = format!(
        "/admin/api/event-classes/{}/photos/",
        class["id"].as_str().unwrap()
    );

    for name in ["a.png", "b.png"] {
        app.upload_with_auth(&uri, name, PNG_BYTES, None, &token)
            .await
            .assert_created();
    }
    app.upload_with_auth(&uri, "c.png", PNG_BYTES, None, &token)
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_suite_gallery_is_unlimited() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let suite: Value = app
        .post_json_with_auth("/admin/api/suites/", AdminFixtures::suite("300"), &token)
        .await
        .json();
    let uri = format!("/admin/api/suites/{}/photos/", suite["id"].as_str().unwrap());

    for i in 0..8 {
        app.upload_with_auth(&uri, &format!("{}.jpg", i), PNG_BYTES, None, &token)
            .await
            .assert_created();
    }
    let photos: Vec<Value> = app.get_with_auth(&uri, &token).await.json();
    assert_eq!(photos.len(), 8);
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let venue_id = create_venue(&app, &token).await;

    let too_big = vec![0u8; app.state.config.media.max_upload_bytes + 1];
    let response = app
        .upload_with_auth(
            &format!("/admin/api/venues/{}/photos/", venue_id),
            "huge.png",
            &too_big,
            None,
            &token,
        )
        .await;
    response.assert_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(count_files(&app.media_root()), 0);
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let venue_id = create_venue(&app, &token).await;

    let boundary = "suitehub-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\nno file\r\n--{boundary}--\r\n"
    );
    let response = app
        .request_with_auth(
            Request::builder()
                .method("POST")
                .uri(format!("/admin/api/venues/{}/photos/", venue_id))
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
            &token,
        )
        .await;
    response.assert_bad_request();
    assert_eq!(response.error_message(), "Missing file field");
}

#[tokio::test]
async fn test_upload_for_unknown_owner_leaves_no_file() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;

    app.upload_with_auth(
        &format!("/admin/api/venues/{}/photos/", UNKNOWN_ID),
        "orphan.png",
        PNG_BYTES,
        None,
        &token,
    )
    .await
    .assert_not_found();
    assert_eq!(count_files(&app.media_root()), 0);
}

#[tokio::test]
async fn test_individual_photo_replaced() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let person: Value = app
        .post_json_with_auth(
            "/admin/api/individuals/",
            AdminFixtures::individual("Mae", "Jemison"),
            &token,
        )
        .await
        .json();
    let uri = format!(
        "/admin/api/individuals/{}/photo/",
        person["id"].as_str().unwrap()
    );

    let first: Value = app
        .upload_with_auth(&uri, "one.png", PNG_BYTES, None, &token)
        .await
        .json();
    let first_path = app.media_root().join(first["photo"].as_str().unwrap());
    assert!(first_path.exists());

    let response = app
        .upload_with_auth(&uri, "two.png", PNG_BYTES, None, &token)
        .await;
    response.assert_ok();
    let second: Value = response.json();
    assert_ne!(second["photo"], first["photo"]);
    assert!(!first_path.exists());
    assert_eq!(count_files(&app.media_root()), 1);
}

#[tokio::test]
async fn test_suite_floor_plan_and_delete_cleanup() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let suite: Value = app
        .post_json_with_auth("/admin/api/suites/", AdminFixtures::suite("12A"), &token)
        .await
        .json();
    let suite_id = suite["id"].as_str().unwrap();

    let response = app
        .upload_with_auth(
            &format!("/admin/api/suites/{}/floor-plan/", suite_id),
            "plan.pdf",
            b"%PDF-1.4 plan",
            None,
            &token,
        )
        .await;
    response.assert_ok();
    let updated: Value = response.json();
    let plan = updated["floor_plan"].as_str().unwrap();
    assert!(plan.starts_with("suite_floorplans/"));

    app.upload_with_auth(
        &format!("/admin/api/suites/{}/photos/", suite_id),
        "desk.jpg",
        PNG_BYTES,
        None,
        &token,
    )
    .await
    .assert_created();
    assert_eq!(count_files(&app.media_root()), 2);

    app.delete_with_auth(&format!("/admin/api/suites/{}/", suite_id), &token)
        .await
        .assert_no_content();
    assert_eq!(count_files(&app.media_root()), 0);
}

#[tokio::test]
async fn test_organization_logo_upload() {
    let app = TestApp::new().await;
    let token = app.staff_token().await;
    let org: Value = app
        .post_json_with_auth(
            "/admin/api/organizations/",
            AdminFixtures::organization("Beacon"),
            &token,
        )
        .await
        .json();

    let response = app
        .upload_with_auth(
            &format!("/admin/api/organizations/{}/logo/", org["id"].as_str().unwrap()),
            "logo.svg",
            b"<svg/>",
            None,
            &token,
        )
        .await;
    response.assert_ok();
    let updated: Value = response.json();
    assert!(updated["logo"]
        .as_str()
        .unwrap()
        .starts_with("organization_logos/"));
}
