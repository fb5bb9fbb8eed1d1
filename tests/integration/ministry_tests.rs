//! Groups, events and announcements integration tests

use chrono::{Duration, Utc};
use serde_json::json;

use crate::common::{admin_token, group_payload, ids, leader_token, member_token, TestApp};

// Groups

#[tokio::test]
async fn test_create_and_update_group() {
    let app = TestApp::new().await;

    let response = app
        .post_as(admin_token(), "/api/v1/groups", group_payload("Fellowship"))
        .await;
    response.assert_created();
    let group: serde_json::Value = response.json();
    let id = group["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("group-"));
    assert_eq!(group["type"], "Fellowship");
    assert!(group["members"].as_array().unwrap().is_empty());

    let uri = format!("/api/v1/groups/{}", id);
    let before = app.audit_len().await;
    let updated: serde_json::Value = app
        .put_as(
            admin_token(),
            &uri,
            json!({ "meetingDay": "Friday", "description": null }),
        )
        .await
        .json();
    assert_eq!(updated["meetingDay"], "Friday");
    assert!(updated["description"].is_null());
    assert_eq!(app.audit_len().await, before + 1);

    // same values again
    app.put_as(admin_token(), &uri, json!({ "meetingDay": "Friday" }))
        .await
        .assert_ok();
    assert_eq!(app.audit_len().await, before + 1);
}

#[tokio::test]
async fn test_group_type_must_be_known() {
    let app = TestApp::new().await;
    let response = app
        .post_as(admin_token(), "/api/v1/groups", group_payload("Choir"))
        .await;

    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn test_delete_group_detaches_events_and_announcements() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/groups/{}", ids::GROUP_EAST);
    app.delete_as(admin_token(), &uri).await.assert_no_content();
    app.get_as(admin_token(), &uri).await.assert_not_found();

    let announcement: serde_json::Value = app
        .get_as(
            member_token(),
            &format!("/api/v1/announcements/{}", ids::ANNOUNCEMENT_FUNDRAISER),
        )
        .await
        .json();
    assert_eq!(announcement["groupIds"], json!([]));

    let uri = format!("/api/v1/groups/{}", ids::GROUP_WORSHIP);
    app.delete_as(admin_token(), &uri).await.assert_no_content();
    let event: serde_json::Value = app
        .get_as(member_token(), &format!("/api/v1/events/{}", ids::EVENT_SUNDAY))
        .await
        .json();
    assert!(event["groupId"].is_null());
}

#[tokio::test]
async fn test_group_member_roster() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/groups/{}/members", ids::GROUP_KIDS);

    let roster: Vec<serde_json::Value> = app.get_as(member_token(), &uri).await.json();
    assert_eq!(roster.len(), 2);
    assert_eq!(roster[0]["user"]["firstName"], "Ariana");

    let response = app
        .post_as(
            admin_token(),
            &uri,
            json!({ "userId": ids::MEMBER_1, "role": "Volunteer" }),
        )
        .await;
    response.assert_created();
    let member: serde_json::Value = response.json();
    assert_eq!(member["role"], "Volunteer");
    assert_eq!(member["status"], "Active");

    let response = app
        .post_as(admin_token(), &uri, json!({ "userId": ids::MEMBER_1 }))
        .await;
    response.assert_conflict();
    assert_eq!(response.error_message(), "User is already a member of this group");

    app.post_as(admin_token(), &uri, json!({ "userId": "user-nobody" }))
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_update_and_remove_group_member() {
    let app = TestApp::new().await;
    let uri = format!(
        "/api/v1/groups/{}/members/{}",
        ids::GROUP_WORSHIP,
        ids::MEMBER_2
    );

    let updated: serde_json::Value = app
        .put_as(admin_token(), &uri, json!({ "role": "CoLeader" }))
        .await
        .json();
    assert_eq!(updated["role"], "CoLeader");

    let page: serde_json::Value = app
        .get_as(admin_token(), "/api/v1/audit-logs?entity=group&pageSize=1")
        .await
        .json();
    let entry = &page["items"][0];
    assert_eq!(entry["action"], "group.member.updated");
    assert_eq!(entry["diff"]["role"]["previous"], "Volunteer");

    app.delete_as(admin_token(), &uri).await.assert_no_content();
    let response = app.delete_as(admin_token(), &uri).await;
    response.assert_not_found();
    assert_eq!(response.error_message(), "Member not found in group");
}

// Events

#[tokio::test]
async fn test_events_listed_in_start_order() {
    let app = TestApp::new().await;
    let events: Vec<serde_json::Value> = app.get_as(member_token(), "/api/v1/events").await.json();

    let order: Vec<&str> = events.iter().filter_map(|e| e["id"].as_str()).collect();
    assert_eq!(
        order,
        vec![ids::EVENT_REHEARSAL, ids::EVENT_SUNDAY, "event-kids-training"]
    );
}

#[tokio::test]
async fn test_create_event_defaults_end_to_start() {
    let app = TestApp::new().await;
    let start = Utc::now() + Duration::days(5);
    let response = app
        .post_as(
            admin_token(),
            "/api/v1/events",
            json!({
                "title": "Prayer Night",
                "startAt": start,
                "groupId": ids::GROUP_EAST,
            }),
        )
        .await;

    response.assert_created();
    let event: serde_json::Value = response.json();
    assert_eq!(event["startAt"], event["endAt"]);
    assert_eq!(event["visibility"], "private");
}

#[tokio::test]
async fn test_event_time_and_group_rules() {
    let app = TestApp::new().await;
    let start = Utc::now() + Duration::days(5);

    let response = app
        .post_as(
            admin_token(),
            "/api/v1/events",
            json!({
                "title": "Backwards",
                "startAt": start,
                "endAt": start - Duration::hours(1),
            }),
        )
        .await;
    response.assert_bad_request();
    assert_eq!(
        response.error_message(),
        "Event end time cannot be before its start time"
    );

    app.post_as(
        admin_token(),
        "/api/v1/events",
        json!({ "title": "Orphan", "startAt": start, "groupId": "group-nope" }),
    )
    .await
    .assert_not_found();

    let uri = format!("/api/v1/events/{}", ids::EVENT_SUNDAY);
    app.put_as(
        admin_token(),
        &uri,
        json!({ "endAt": Utc::now() - Duration::days(30) }),
    )
    .await
    .assert_bad_request();
}

#[tokio::test]
async fn test_self_attendance() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/events/{}/attendance", ids::EVENT_REHEARSAL);

    let response = app
        .post_as(member_token(), &uri, json!({ "status": "checkedIn" }))
        .await;
    response.assert_ok();
    let record: serde_json::Value = response.json();
    assert_eq!(record["userId"], ids::MEMBER_1);
    assert_eq!(record["recordedBy"], ids::MEMBER_1);

    let roll: Vec<serde_json::Value> = app.get_as(member_token(), &uri).await.json();
    assert_eq!(roll.len(), 2);

    let page: serde_json::Value = app
        .get_as(admin_token(), "/api/v1/audit-logs?entity=event&pageSize=1")
        .await
        .json();
    assert_eq!(
        page["items"][0]["summary"],
        "Maria Taulagi recorded their attendance as checkedIn for Worship Team Rehearsal"
    );
    assert!(page["items"][0]["diff"].is_null());
}

#[tokio::test]
async fn test_attendance_status_change_is_diffed() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/events/{}/attendance", ids::EVENT_SUNDAY);

    app.post_as(
        leader_token(),
        &uri,
        json!({ "userId": ids::MEMBER_1, "status": "excused", "note": "Away" }),
    )
    .await
    .assert_ok();

    let page: serde_json::Value = app
        .get_as(admin_token(), "/api/v1/audit-logs?entity=event&pageSize=1")
        .await
        .json();
    let entry = &page["items"][0];
    assert_eq!(
        entry["summary"],
        "Sione Latu marked Maria Taulagi as excused for Sunday Service"
    );
    assert_eq!(entry["diff"]["status"]["previous"], "checkedIn");
    assert_eq!(entry["diff"]["status"]["newValue"], "excused");
    assert_eq!(entry["metadata"]["previousStatus"], "checkedIn");

    let roll: Vec<serde_json::Value> = app.get_as(member_token(), &uri).await.json();
    assert_eq!(roll.len(), 2);
}

#[tokio::test]
async fn test_delete_event() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/events/{}", ids::EVENT_REHEARSAL);

    app.delete_as(admin_token(), &uri).await.assert_no_content();
    app.get_as(member_token(), &uri).await.assert_not_found();
    app.post_as(
        member_token(),
        &format!("{}/attendance", uri),
        json!({ "status": "absent" }),
    )
    .await
    .assert_not_found();
}

// Announcements

#[tokio::test]
async fn test_announcements_newest_first_with_reads() {
    let app = TestApp::new().await;
    let list: Vec<serde_json::Value> = app
        .get_as(member_token(), "/api/v1/announcements")
        .await
        .json();

    assert_eq!(list[0]["id"], ids::ANNOUNCEMENT_FUNDRAISER);
    assert_eq!(list[1]["id"], ids::ANNOUNCEMENT_WELCOME);
    assert_eq!(list[1]["reads"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_audience_all_drops_group_targeting() {
    let app = TestApp::new().await;
    let response = app
        .post_as(
            admin_token(),
            "/api/v1/announcements",
            json!({
                "title": "Working bee",
                "body": "Bring gloves",
                "audience": "all",
                "groupIds": [ids::GROUP_EAST],
            }),
        )
        .await;

    response.assert_created();
    let announcement: serde_json::Value = response.json();
    assert!(announcement["groupIds"].is_null());
    assert!(announcement["reads"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_custom_audience_requires_known_groups() {
    let app = TestApp::new().await;
    let response = app
        .post_as(
            admin_token(),
            "/api/v1/announcements",
            json!({
                "title": "Secret",
                "body": "Shh",
                "audience": "custom",
                "groupIds": ["group-nope"],
            }),
        )
        .await;

    response.assert_not_found();
    assert_eq!(response.error_message(), "Group not found");
}

#[tokio::test]
async fn test_switching_to_all_clears_groups() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/announcements/{}", ids::ANNOUNCEMENT_FUNDRAISER);

    let updated: serde_json::Value = app
        .put_as(admin_token(), &uri, json!({ "audience": "all" }))
        .await
        .json();
    assert_eq!(updated["audience"], "all");
    assert!(updated["groupIds"].is_null());

    let page: serde_json::Value = app
        .get_as(admin_token(), "/api/v1/audit-logs?entity=announcement&pageSize=1")
        .await
        .json();
    let diff = page["items"][0]["diff"].as_object().unwrap();
    assert!(diff.contains_key("audience"));
    assert!(diff.contains_key("groupIds"));
}

#[tokio::test]
async fn test_mark_read_keeps_first_receipt() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/announcements/{}/read", ids::ANNOUNCEMENT_WELCOME);

    let first: serde_json::Value = app.post_as(member_token(), &uri, json!({})).await.json();
    let second: serde_json::Value = app.post_as(member_token(), &uri, json!({})).await.json();
    assert_eq!(first["readAt"], second["readAt"]);
    assert_eq!(first["userId"], ids::MEMBER_1);

    app.post_as(member_token(), "/api/v1/announcements/nope/read", json!({}))
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_delete_announcement() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/announcements/{}", ids::ANNOUNCEMENT_WELCOME);

    app.delete_as(admin_token(), &uri).await.assert_no_content();
    app.get_as(member_token(), &uri).await.assert_not_found();
}
