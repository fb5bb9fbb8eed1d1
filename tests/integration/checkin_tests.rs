//! Households and children's check-in integration tests

use serde_json::json;

use crate::common::{admin_token, ids, leader_token, member_token, TestApp};

async fn open_checkin(app: &TestApp) -> String {
    let response = app
        .post_as(
            leader_token(),
            "/api/v1/checkin/checkins",
            json!({ "eventId": ids::EVENT_SUNDAY, "childId": ids::CHILD_MELE }),
        )
        .await;
    response.assert_created();
    response.json::<serde_json::Value>()["id"]
        .as_str()
        .unwrap()
        .to_string()
}

// Households

#[tokio::test]
async fn test_households_sorted_by_name() {
    let app = TestApp::new().await;
    let households: Vec<serde_json::Value> = app
        .get_as(member_token(), "/api/v1/households")
        .await
        .json();

    let names: Vec<&str> = households.iter().filter_map(|h| h["name"].as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert_eq!(names.len(), 5);
}

#[tokio::test]
async fn test_household_detail() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/households/{}", ids::HOUSEHOLD_TAULAGI);
    let household: serde_json::Value = app.get_as(member_token(), &uri).await.json();

    assert_eq!(household["name"], "Taulagi Family");
    assert_eq!(household["members"][0]["userId"], ids::MEMBER_1);
    assert_eq!(household["members"][0]["name"], "Maria Taulagi");
    assert_eq!(household["children"][0]["fullName"], "Mele Taulagi");
}

#[tokio::test]
async fn test_update_household_address() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/households/{}", ids::HOUSEHOLD_TAULAGI);

    let before = app.audit_len().await;
    let household: serde_json::Value = app
        .put_as(admin_token(), &uri, json!({ "address": "3 Kauri Lane" }))
        .await
        .json();
    assert_eq!(household["address"], "3 Kauri Lane");
    assert_eq!(app.audit_len().await, before + 1);

    app.get_as(member_token(), "/api/v1/households/household-nope")
        .await
        .assert_not_found();
}

// Children

#[tokio::test]
async fn test_child_lifecycle() {
    let app = TestApp::new().await;

    let response = app
        .post_as(
            leader_token(),
            "/api/v1/checkin/children",
            json!({
                "householdId": ids::HOUSEHOLD_TAULAGI,
                "fullName": " Sefa Taulagi ",
                "dateOfBirth": "2020-02-29",
                "allergies": "Dairy",
            }),
        )
        .await;
    response.assert_created();
    let child: serde_json::Value = response.json();
    let id = child["id"].as_str().unwrap().to_string();
    assert_eq!(child["fullName"], "Sefa Taulagi");

    let children_uri = format!("/api/v1/households/{}/children", ids::HOUSEHOLD_TAULAGI);
    let children: Vec<serde_json::Value> = app.get_as(member_token(), &children_uri).await.json();
    assert_eq!(children.len(), 2);

    let uri = format!("/api/v1/checkin/children/{}", id);
    let updated: serde_json::Value = app
        .put_as(leader_token(), &uri, json!({ "allergies": null }))
        .await
        .json();
    assert!(updated["allergies"].is_null());

    app.delete_as(leader_token(), &uri).await.assert_ok();
    let children: Vec<serde_json::Value> = app.get_as(member_token(), &children_uri).await.json();
    assert_eq!(children.len(), 1);

    let response = app.delete_as(leader_token(), &uri).await;
    response.assert_bad_request();
    assert_eq!(response.error_message(), "Child is already deleted");

    app.post_as(leader_token(), &format!("{}/restore", uri), json!({}))
        .await
        .assert_ok();
    let children: Vec<serde_json::Value> = app.get_as(member_token(), &children_uri).await.json();
    assert_eq!(children.len(), 2);
}

#[tokio::test]
async fn test_child_needs_a_household() {
    let app = TestApp::new().await;
    let response = app
        .post_as(
            leader_token(),
            "/api/v1/checkin/children",
            json!({
                "householdId": "household-nope",
                "fullName": "Nobody",
                "dateOfBirth": "2020-01-01",
            }),
        )
        .await;

    response.assert_not_found();
    assert_eq!(response.error_message(), "Household not found");
}

// Check-ins

#[tokio::test]
async fn test_checkin_starts_pending() {
    let app = TestApp::new().await;
    let id = open_checkin(&app).await;

    let list: Vec<serde_json::Value> = app
        .get_as(
            leader_token(),
            &format!("/api/v1/checkin/checkins?eventId={}", ids::EVENT_SUNDAY),
        )
        .await
        .json();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], id);
    assert_eq!(list[0]["status"], "pending");
    assert_eq!(list[0]["child"]["fullName"], "Mele Taulagi");
    assert!(list[0]["checkinTime"].is_null());
}

#[tokio::test]
async fn test_checkin_requires_live_child_and_event() {
    let app = TestApp::new().await;

    app.post_as(
        leader_token(),
        "/api/v1/checkin/checkins",
        json!({ "eventId": "event-nope", "childId": ids::CHILD_MELE }),
    )
    .await
    .assert_not_found();

    let child_uri = format!("/api/v1/checkin/children/{}", ids::CHILD_MELE);
    app.delete_as(leader_token(), &child_uri).await.assert_ok();
    let response = app
        .post_as(
            leader_token(),
            "/api/v1/checkin/checkins",
            json!({ "eventId": ids::EVENT_SUNDAY, "childId": ids::CHILD_MELE }),
        )
        .await;
    response.assert_not_found();
    assert_eq!(response.error_message(), "Child not found");
}

#[tokio::test]
async fn test_check_in_and_out_stamps_actor() {
    let app = TestApp::new().await;
    let id = open_checkin(&app).await;
    let uri = format!("/api/v1/checkin/checkins/{}", id);

    let checked_in: serde_json::Value = app
        .put_as(leader_token(), &uri, json!({ "status": "checked-in" }))
        .await
        .json();
    assert_eq!(checked_in["status"], "checked-in");
    assert_eq!(checked_in["checkedInBy"], ids::LEADER);
    assert!(checked_in["checkinTime"].is_string());

    let checked_out: serde_json::Value = app
        .put_as(admin_token(), &uri, json!({ "status": "checked-out" }))
        .await
        .json();
    assert_eq!(checked_out["checkedOutBy"], ids::ADMIN);
    assert_eq!(checked_out["checkedInBy"], ids::LEADER);
    assert_eq!(checked_out["checkinTime"], checked_in["checkinTime"]);

    let list: Vec<serde_json::Value> = app
        .get_as(leader_token(), "/api/v1/checkin/checkins?status=checked-out")
        .await
        .json();
    assert_eq!(list.len(), 1);

    let page: serde_json::Value = app
        .get_as(admin_token(), &format!("/api/v1/audit-logs?entityId={}", id))
        .await
        .json();
    // created, checked in, checked out
    assert_eq!(page["meta"]["total"], 3);
    let latest = &page["items"][0];
    assert_eq!(latest["action"], "checkin.updated");
    assert_eq!(latest["diff"]["status"]["previous"], "checked-in");
}

#[tokio::test]
async fn test_deleting_event_removes_checkins() {
    let app = TestApp::new().await;
    open_checkin(&app).await;

    app.delete_as(
        admin_token(),
        &format!("/api/v1/events/{}", ids::EVENT_SUNDAY),
    )
    .await
    .assert_no_content();

    let list: Vec<serde_json::Value> = app
        .get_as(leader_token(), "/api/v1/checkin/checkins")
        .await
        .json();
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_unknown_checkin() {
    let app = TestApp::new().await;
    let response = app
        .put_as(
            leader_token(),
            "/api/v1/checkin/checkins/checkin-nope",
            json!({ "status": "checked-in" }),
        )
        .await;

    response.assert_not_found();
    assert_eq!(response.error_message(), "Check-in not found");
}
