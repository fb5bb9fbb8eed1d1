//! Request types, member requests and invitations integration tests

use serde_json::{json, Value};

use crate::common::{admin_token, ids, leader_token, member_token, TestApp};

// Request types

#[tokio::test]
async fn test_built_in_request_types_listed_in_order() {
    let app = TestApp::new().await;
    let types: Vec<Value> = app
        .get_as(member_token(), "/api/v1/request-types")
        .await
        .json();

    let names: Vec<&str> = types.iter().filter_map(|t| t["name"].as_str()).collect();
    assert_eq!(names, ["Prayer", "Benevolence", "Improvement", "Suggestion"]);
    assert_eq!(types[0]["isBuiltIn"], true);
    assert_eq!(types[0]["hasConfidentialField"], true);
}

#[tokio::test]
async fn test_request_type_lifecycle() {
    let app = TestApp::new().await;

    let response = app
        .post_as(
            member_token(),
            "/api/v1/request-types",
            json!({ "name": "Facilities" }),
        )
        .await;
    response.assert_forbidden();
    assert_eq!(
        response.error_message(),
        "Admin role required to manage request types"
    );

    let response = app
        .post_as(
            admin_token(),
            "/api/v1/request-types",
            json!({ "name": "Facilities", "description": "Building issues" }),
        )
        .await;
    response.assert_created();
    let created: Value = response.json();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["displayOrder"], 5);

    let uri = format!("/api/v1/request-types/{}", id);
    let renamed: Value = app
        .put_as(admin_token(), &uri, json!({ "name": "Buildings" }))
        .await
        .json();
    assert_eq!(renamed["name"], "Buildings");

    let archived: Value = app
        .post_as(admin_token(), &format!("{}/archive", uri), json!({}))
        .await
        .json();
    assert_eq!(archived["status"], "archived");

    let active: Vec<Value> = app
        .get_as(admin_token(), "/api/v1/request-types")
        .await
        .json();
    assert_eq!(active.len(), 4);
    let all: Vec<Value> = app
        .get_as(admin_token(), "/api/v1/request-types?includeArchived=true")
        .await
        .json();
    assert_eq!(all.len(), 5);
    let member_view: Vec<Value> = app
        .get_as(member_token(), "/api/v1/request-types?includeArchived=true")
        .await
        .json();
    assert_eq!(member_view.len(), 4);

    let reactivated: Value = app
        .put_as(
            admin_token(),
            &format!("{}/status", uri),
            json!({ "status": "active" }),
        )
        .await
        .json();
    assert_eq!(reactivated["status"], "active");
}

#[tokio::test]
async fn test_built_in_request_type_is_locked() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/request-types/{}", ids::REQUEST_TYPE_PRAYER);

    let response = app
        .put_as(admin_token(), &uri, json!({ "name": "Intercession" }))
        .await;
    response.assert_bad_request();
    assert_eq!(response.error_message(), "Cannot edit a built-in request type");

    let response = app
        .post_as(admin_token(), &format!("{}/archive", uri), json!({}))
        .await;
    response.assert_bad_request();
    assert_eq!(response.error_message(), "Cannot archive a built-in request type");
}

#[tokio::test]
async fn test_reorder_request_types() {
    let app = TestApp::new().await;
    let reordered: Vec<Value> = app
        .post_as(
            admin_token(),
            "/api/v1/request-types/reorder",
            json!({ "ids": [ids::REQUEST_TYPE_SUGGESTION] }),
        )
        .await
        .json();

    assert_eq!(reordered[0]["id"], ids::REQUEST_TYPE_SUGGESTION);
    assert_eq!(reordered[0]["displayOrder"], 1);
    assert_eq!(reordered[1]["id"], ids::REQUEST_TYPE_PRAYER);
}

// Member requests

#[tokio::test]
async fn test_member_files_and_sees_own_requests() {
    let app = TestApp::new().await;

    let response = app
        .post_as(
            member_token(),
            "/api/v1/requests",
            json!({
                "requestTypeId": ids::REQUEST_TYPE_PRAYER,
                "title": "Hospital visit",
                "body": "Please pray for my aunty",
                "isConfidential": true,
            }),
        )
        .await;
    response.assert_created();
    let request: Value = response.json();
    let id = request["id"].as_str().unwrap().to_string();
    assert_eq!(request["userId"], ids::MEMBER_1);
    assert_eq!(request["isConfidential"], true);
    assert_eq!(request["status"], "Pending");

    app.post_as(
        leader_token(),
        "/api/v1/requests",
        json!({
            "requestTypeId": ids::REQUEST_TYPE_SUGGESTION,
            "title": "Longer morning tea",
            "body": "Ten more minutes",
        }),
    )
    .await
    .assert_created();

    let mine: Vec<Value> = app.get_as(member_token(), "/api/v1/requests").await.json();
    assert_eq!(mine.len(), 1);
    let everyone: Vec<Value> = app.get_as(leader_token(), "/api/v1/requests").await.json();
    assert_eq!(everyone.len(), 2);

    let uri = format!("/api/v1/requests/{}", id);
    app.get_as(member_token(), &uri).await.assert_ok();
    let leader_request = everyone
        .iter()
        .find(|r| r["userId"] == ids::LEADER)
        .unwrap();
    let response = app
        .get_as(
            member_token(),
            &format!("/api/v1/requests/{}", leader_request["id"].as_str().unwrap()),
        )
        .await;
    response.assert_forbidden();
    assert_eq!(response.error_message(), "You can only view your own requests");
}

#[tokio::test]
async fn test_only_leaders_work_requests() {
    let app = TestApp::new().await;
    let request: Value = app
        .post_as(
            member_token(),
            "/api/v1/requests",
            json!({
                "requestTypeId": ids::REQUEST_TYPE_PRAYER,
                "title": "Exams",
                "body": "Strength for the week",
            }),
        )
        .await
        .json();
    let uri = format!("/api/v1/requests/{}", request["id"].as_str().unwrap());

    app.put_as(member_token(), &uri, json!({ "status": "Closed" }))
        .await
        .assert_forbidden();

    let updated: Value = app
        .put_as(
            leader_token(),
            &uri,
            json!({ "status": "InProgress", "assigneeId": ids::LEADER }),
        )
        .await
        .json();
    assert_eq!(updated["status"], "InProgress");
    assert_eq!(updated["assigneeId"], ids::LEADER);
}

// Invitations

#[tokio::test]
async fn test_invitation_flow() {
    let app = TestApp::new().await;

    let response = app
        .post_as(
            member_token(),
            "/api/v1/invitations",
            json!({ "email": "new@example.com" }),
        )
        .await;
    response.assert_forbidden();
    assert_eq!(
        response.error_message(),
        "Admin role required to manage invitations"
    );

    let response = app
        .post_as(
            admin_token(),
            "/api/v1/invitations",
            json!({ "email": "New@Example.com", "roleId": "leader", "type": "team" }),
        )
        .await;
    response.assert_created();
    let invitation: Value = response.json();
    assert_eq!(invitation["email"], "new@example.com");
    assert_eq!(invitation["type"], "team");
    assert_eq!(invitation["status"], "pending");
    let token = invitation["invitationToken"].as_str().unwrap().to_string();

    app.post_as(
        admin_token(),
        "/api/v1/invitations",
        json!({ "email": "new@example.com" }),
    )
    .await
    .assert_conflict();

    // looking up and accepting need no session
    let found: Value = app
        .get(&format!("/api/v1/invitations/token/{}", token))
        .await
        .json();
    assert_eq!(found["id"], invitation["id"]);

    let accepted = app
        .post_json("/api/v1/invitations/accept", json!({ "token": token }))
        .await;
    accepted.assert_ok();
    assert_eq!(accepted.json::<Value>()["status"], "accepted");

    let response = app
        .post_json("/api/v1/invitations/accept", json!({ "token": token }))
        .await;
    response.assert_bad_request();
    assert_eq!(response.error_message(), "Invitation is no longer pending");

    let listed: Vec<Value> = app
        .get_as(admin_token(), "/api/v1/invitations")
        .await
        .json();
    assert_eq!(listed.len(), 1);
    app.get_as(leader_token(), "/api/v1/invitations")
        .await
        .assert_forbidden();
}

#[tokio::test]
async fn test_invitation_validation_and_unknown_token() {
    let app = TestApp::new().await;

    let response = app
        .post_as(
            admin_token(),
            "/api/v1/invitations",
            json!({ "email": "not-an-email" }),
        )
        .await;
    response.assert_unprocessable();
    let body: Value = response.json();
    assert_eq!(body["details"]["email"], json!(["email"]));

    app.get("/api/v1/invitations/token/nope")
        .await
        .assert_not_found();
}
