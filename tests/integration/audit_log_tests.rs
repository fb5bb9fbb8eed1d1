//! Audit trail integration tests
//!
//! Listing, filtering and paging over HTTP, plus snapshot persistence
//! across application restarts.

use serde_json::json;
use tempfile::TempDir;

use crate::common::{
    admin_token, ids, leader_token, test_config, TestApp, UserFactory, SEEDED_AUDIT_COUNT,
};

#[tokio::test]
async fn test_seeded_trail_newest_first() {
    let app = TestApp::new().await;
    let response = app.get_as(admin_token(), "/api/v1/audit-logs").await;

    response.assert_ok();
    let page: serde_json::Value = response.json();
    assert_eq!(page["meta"]["total"], SEEDED_AUDIT_COUNT);
    assert_eq!(page["meta"]["page"], 1);
    assert_eq!(page["meta"]["pageSize"], 20);

    let ids: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|item| item["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["audit-3", "audit-2", "audit-1"]);
}

#[tokio::test]
async fn test_items_carry_their_actor() {
    let app = TestApp::new().await;
    let page: serde_json::Value = app
        .get_as(admin_token(), "/api/v1/audit-logs?actorUserId=user-leader")
        .await
        .json();

    assert_eq!(page["meta"]["total"], 1);
    let item = &page["items"][0];
    assert_eq!(item["action"], "announcement.read");
    assert_eq!(item["actor"]["id"], ids::LEADER);
}

#[tokio::test]
async fn test_filter_by_entity_and_entity_id() {
    let app = TestApp::new().await;

    let page: serde_json::Value = app
        .get_as(admin_token(), "/api/v1/audit-logs?entity=contribution")
        .await
        .json();
    assert_eq!(page["meta"]["total"], 1);
    assert_eq!(page["items"][0]["entityId"], "contribution-2");

    let uri = format!("/api/v1/audit-logs?entityId={}", ids::EVENT_SUNDAY);
    let page: serde_json::Value = app.get_as(admin_token(), &uri).await.json();
    assert_eq!(page["meta"]["total"], 1);
    assert_eq!(page["items"][0]["action"], "attendance.updated");
}

#[tokio::test]
async fn test_filter_by_time_window() {
    let app = TestApp::new().await;

    let page: serde_json::Value = app
        .get_as(admin_token(), "/api/v1/audit-logs?to=2000-01-01T00:00:00Z")
        .await
        .json();
    assert_eq!(page["meta"]["total"], 0);
    assert!(page["items"].as_array().unwrap().is_empty());

    let page: serde_json::Value = app
        .get_as(admin_token(), "/api/v1/audit-logs?from=2000-01-01T00:00:00Z")
        .await
        .json();
    assert_eq!(page["meta"]["total"], SEEDED_AUDIT_COUNT);
}

#[tokio::test]
async fn test_other_church_is_empty() {
    let app = TestApp::new().await;
    let page: serde_json::Value = app
        .get_as(admin_token(), "/api/v1/audit-logs?churchId=church-elsewhere")
        .await
        .json();

    assert_eq!(page["meta"]["total"], 0);
}

#[tokio::test]
async fn test_paging_normalizes_bad_values() {
    let app = TestApp::new().await;

    let page: serde_json::Value = app
        .get_as(admin_token(), "/api/v1/audit-logs?page=0&pageSize=-5")
        .await
        .json();
    assert_eq!(page["meta"]["page"], 1);
    assert_eq!(page["meta"]["pageSize"], 20);

    let page: serde_json::Value = app
        .get_as(admin_token(), "/api/v1/audit-logs?page=9&pageSize=2")
        .await
        .json();
    assert!(page["items"].as_array().unwrap().is_empty());
    assert_eq!(page["meta"]["total"], SEEDED_AUDIT_COUNT);
}

#[tokio::test]
async fn test_leaders_cannot_read_the_trail() {
    let app = TestApp::new().await;
    let response = app.get_as(leader_token(), "/api/v1/audit-logs").await;

    response.assert_forbidden();
    assert_eq!(response.error_message(), "Admin role required to view audit logs");
}

#[tokio::test]
async fn test_announcement_read_is_audited_once() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/announcements/{}/read", ids::ANNOUNCEMENT_FUNDRAISER);

    let before = app.audit_len().await;
    app.post_as(leader_token(), &uri, json!({})).await.assert_ok();
    app.post_as(leader_token(), &uri, json!({})).await.assert_ok();

    assert_eq!(app.audit_len().await, before + 1);
}

#[tokio::test]
async fn test_trail_survives_restart() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config();
    config.audit.persist = true;
    config.audit.file = dir.path().join("audit-log.json");

    let first = TestApp::with_config(config.clone()).await;
    assert!(config.audit.file.exists());

    let payload = UserFactory::new()
        .create()
        .with_email("persisted@example.com")
        .build();
    first
        .post_as(admin_token(), "/api/v1/users", payload)
        .await
        .assert_created();
    assert_eq!(first.audit_len().await, SEEDED_AUDIT_COUNT + 1);

    let second = TestApp::with_config(config).await;
    assert_eq!(second.audit_len().await, SEEDED_AUDIT_COUNT + 1);

    let page: serde_json::Value = second
        .get_as(admin_token(), "/api/v1/audit-logs?entity=user")
        .await
        .json();
    assert_eq!(page["items"][0]["action"], "user.created");
    assert_eq!(page["items"][0]["metadata"]["email"], "persisted@example.com");
}

#[tokio::test]
async fn test_corrupt_snapshot_falls_back_to_seed() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("audit-log.json");
    std::fs::write(&file, "{ not json").unwrap();

    let mut config = test_config();
    config.audit.persist = true;
    config.audit.file = file;

    let app = TestApp::with_config(config).await;
    assert_eq!(app.audit_len().await, SEEDED_AUDIT_COUNT);
}
