//! Audit trail step definitions

use axum::http::Method;
use cucumber::{then, when};
use serde_json::json;

use crate::features::support::TestWorld;

#[when(expr = "I set the phone of {string} to {string}")]
async fn set_phone(world: &mut TestWorld, user_id: String, phone: String) {
    let uri = format!("/api/v1/users/{}", user_id);
    world
        .send(Method::PUT, &uri, Some(json!({ "phone": phone })))
        .await;
}

#[when(expr = "I clear the phone of {string}")]
async fn clear_phone(world: &mut TestWorld, user_id: String) {
    let uri = format!("/api/v1/users/{}", user_id);
    world
        .send(Method::PUT, &uri, Some(json!({ "phone": null })))
        .await;
}

#[when(expr = "I create a user with email {string}")]
async fn create_user(world: &mut TestWorld, email: String) {
    let body = json!({
        "primaryEmail": email,
        "firstName": "Ana",
        "lastName": "Fifita",
    });
    world.send(Method::POST, "/api/v1/users", Some(body)).await;
}

#[when(expr = "I delete the user {string}")]
async fn delete_user(world: &mut TestWorld, user_id: String) {
    let uri = format!("/api/v1/users/{}", user_id);
    world.send(Method::DELETE, &uri, None).await;
}

#[when("I request the audit log")]
async fn request_audit_log(world: &mut TestWorld) {
    world.send(Method::GET, "/api/v1/audit-logs", None).await;
}

#[when(expr = "I request audit log page {int} with page size {int}")]
async fn request_audit_page(world: &mut TestWorld, page: i64, page_size: i64) {
    let uri = format!("/api/v1/audit-logs?page={}&pageSize={}", page, page_size);
    world.send(Method::GET, &uri, None).await;
}

#[then(expr = "the audit trail should have grown by {int}")]
async fn audit_grew_by(world: &mut TestWorld, count: usize) {
    assert_eq!(world.audit_len().await, world.audit_baseline + count);
}

#[then("the audit trail should not have grown")]
async fn audit_unchanged(world: &mut TestWorld) {
    assert_eq!(world.audit_len().await, world.audit_baseline);
}

#[then(expr = "the latest audit entry should have action {string}")]
async fn latest_action(world: &mut TestWorld, action: String) {
    let store = world.store.read().await;
    let entry = store.audit_log().last().expect("audit trail is empty");
    assert_eq!(entry.action, action);
}

#[then(expr = "the latest audit diff should only change {string}")]
async fn latest_diff_fields(world: &mut TestWorld, field: String) {
    let store = world.store.read().await;
    let entry = store.audit_log().last().expect("audit trail is empty");
    let diff = entry.diff.as_ref().expect("entry has no diff");
    assert_eq!(diff.keys().collect::<Vec<_>>(), vec![&field]);
}

#[then(expr = "the latest audit diff should change {string} from {string} to {string}")]
async fn latest_diff_values(world: &mut TestWorld, field: String, previous: String, new: String) {
    let store = world.store.read().await;
    let entry = store.audit_log().last().expect("audit trail is empty");
    let change = &entry.diff.as_ref().expect("entry has no diff")[&field];
    assert_eq!(change.previous, json!(previous));
    assert_eq!(change.new_value, json!(new));
}

#[then(expr = "the latest audit diff should clear {string}")]
async fn latest_diff_cleared(world: &mut TestWorld, field: String) {
    let store = world.store.read().await;
    let entry = store.audit_log().last().expect("audit trail is empty");
    let change = &entry.diff.as_ref().expect("entry has no diff")[&field];
    assert!(!change.previous.is_null());
    assert!(change.new_value.is_null());
}

#[then(expr = "the page should contain {int} audit entries")]
async fn page_item_count(world: &mut TestWorld, count: usize) {
    let items = world.response().body["items"]
        .as_array()
        .expect("items should be an array")
        .len();
    assert_eq!(items, count);
}

#[then(expr = "the page size should be {int}")]
async fn page_size(world: &mut TestWorld, size: u64) {
    assert_eq!(world.response().body["meta"]["pageSize"], size);
}

#[then(expr = "no record should reference {string}")]
async fn no_references(world: &mut TestWorld, user_id: String) {
    for uri in [
        "/api/v1/groups",
        "/api/v1/events",
        "/api/v1/announcements",
        "/api/v1/giving/contributions",
        "/api/v1/users",
    ] {
        world.send(Method::GET, uri, None).await;
        let body = world.response().body.to_string();
        assert!(
            !body.contains(&format!("\"{}\"", user_id)),
            "{} still references {}",
            uri,
            user_id
        );
    }
}
