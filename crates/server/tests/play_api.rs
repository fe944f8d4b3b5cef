//! Playback API tests.

mod common;

use axum::http::StatusCode;

use common::{fixtures, TestFixture};

fn play_path(item_id: u64, base_url: &str) -> String {
    format!(
        "/api/v1/play/{}?source={}",
        item_id,
        urlencoding::encode(base_url)
    )
}

#[tokio::test]
async fn test_play_resolves_groups_and_default_episode() {
    let fixture = TestFixture::new();
    fixture
        .catalog
        .set_detail(fixtures::BASE_A, fixtures::series_entry(10, "Show", 2))
        .await;

    let response = fixture.get(&play_path(10, fixtures::BASE_A)).await;
    assert_eq!(response.status, StatusCode::OK);

    let body = &response.body;
    assert_eq!(body["item_id"], 10);
    assert_eq!(body["source"], fixtures::BASE_A);
    assert_eq!(body["playable"], true);
    assert_eq!(body["detail"]["vod_name"], "Show");
    assert_eq!(body["groups"][0]["episodes"].as_array().unwrap().len(), 2);
    assert_eq!(body["default_episode"]["name"], "EP01");
    assert_eq!(
        body["default_episode"]["url"],
        "https://stream.example/10/1.m3u8"
    );
}

#[tokio::test]
async fn test_play_without_streams_is_unplayable() {
    let fixture = TestFixture::new();
    fixture
        .catalog
        .set_detail(fixtures::BASE_A, fixtures::unplayable_entry(11, "Web Only"))
        .await;

    let response = fixture.get(&play_path(11, fixtures::BASE_A)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["playable"], false);
    assert!(response.body["default_episode"].is_null());
    assert!(response.body["groups"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_play_unknown_item_is_not_found() {
    let fixture = TestFixture::new();

    let response = fixture.get(&play_path(404, fixtures::BASE_A)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_play_catalog_failure_is_bad_gateway() {
    let fixture = TestFixture::new();
    fixture.catalog.fail_source(fixtures::BASE_A, "reset by peer").await;

    let response = fixture.get(&play_path(1, fixtures::BASE_A)).await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_play_requires_source() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/play/1").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
