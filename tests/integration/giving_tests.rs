//! Giving integration tests

use serde_json::json;

use crate::common::{admin_token, contribution_payload, ids, leader_token, member_token, TestApp};

#[tokio::test]
async fn test_list_funds_hides_deleted_by_default() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/giving/funds/{}", ids::FUND_MISSIONS);
    app.delete_as(admin_token(), &uri).await.assert_ok();

    let funds: Vec<serde_json::Value> = app
        .get_as(member_token(), "/api/v1/giving/funds")
        .await
        .json();
    assert_eq!(funds.len(), 1);
    assert_eq!(funds[0]["id"], ids::FUND_GENERAL);

    let funds: Vec<serde_json::Value> = app
        .get_as(member_token(), "/api/v1/giving/funds?includeDeleted=true")
        .await
        .json();
    assert_eq!(funds.len(), 2);
}

#[tokio::test]
async fn test_fund_management_needs_giving_permission() {
    let app = TestApp::new().await;
    let response = app
        .post_as(
            member_token(),
            "/api/v1/giving/funds",
            json!({ "name": "Building" }),
        )
        .await;

    response.assert_forbidden();
    assert_eq!(response.error_message(), "Leader or Admin role required");

    let uri = format!("/api/v1/giving/funds/{}", ids::FUND_GENERAL);
    app.put_as(member_token(), &uri, json!({ "name": "Tithes" }))
        .await
        .assert_forbidden();
    app.delete_as(member_token(), &uri).await.assert_forbidden();
}

#[tokio::test]
async fn test_fund_lifecycle() {
    let app = TestApp::new().await;
    let before = app.audit_len().await;

    let response = app
        .post_as(
            admin_token(),
            "/api/v1/giving/funds",
            json!({ "name": "  Building Fund ", "description": "New hall" }),
        )
        .await;
    response.assert_created();
    let fund: serde_json::Value = response.json();
    let id = fund["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("fund-"));
    assert_eq!(fund["name"], "Building Fund");

    let uri = format!("/api/v1/giving/funds/{}", id);
    let updated: serde_json::Value = app
        .put_as(admin_token(), &uri, json!({ "description": null }))
        .await
        .json();
    assert!(updated["description"].is_null());

    let deleted: serde_json::Value = app.delete_as(admin_token(), &uri).await.json();
    assert!(deleted["deletedAt"].is_string());

    // deleting twice is a rule violation
    app.delete_as(admin_token(), &uri).await.assert_bad_request();

    let restored = app
        .post_as(admin_token(), &format!("{}/restore", uri), json!({}))
        .await;
    restored.assert_ok();
    assert!(restored.json::<serde_json::Value>()["deletedAt"].is_null());

    app.delete_as(admin_token(), &format!("{}/permanent", uri))
        .await
        .assert_no_content();

    // created, updated, deleted, restored, purged
    assert_eq!(app.audit_len().await, before + 5);
}

#[tokio::test]
async fn test_gifts_cannot_go_to_deleted_fund() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/giving/funds/{}", ids::FUND_MISSIONS);
    app.delete_as(admin_token(), &uri).await.assert_ok();

    let response = app
        .post_as(
            admin_token(),
            "/api/v1/giving/contributions",
            contribution_payload(ids::MEMBER_2, ids::FUND_MISSIONS, 15.0),
        )
        .await;

    response.assert_not_found();
    assert_eq!(response.error_message(), "Fund not found");
}

#[tokio::test]
async fn test_purging_fund_orphans_contributions() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/giving/funds/{}/permanent", ids::FUND_MISSIONS);
    app.delete_as(admin_token(), &uri).await.assert_no_content();

    let gift: serde_json::Value = app
        .get_as(admin_token(), "/api/v1/giving/contributions/contribution-2")
        .await
        .json();
    assert!(gift["fundId"].is_null());
}

#[tokio::test]
async fn test_leader_logs_own_gift() {
    let app = TestApp::new().await;
    let response = app
        .post_as(
            leader_token(),
            "/api/v1/giving/contributions",
            json!({ "amount": 25, "fundId": ids::FUND_MISSIONS, "method": "bank-transfer" }),
        )
        .await;

    response.assert_created();
    let gift: serde_json::Value = response.json();
    assert_eq!(gift["memberId"], ids::LEADER);
    assert_eq!(gift["method"], "bank-transfer");

    let page: serde_json::Value = app
        .get_as(admin_token(), "/api/v1/audit-logs?entity=contribution&pageSize=1")
        .await
        .json();
    assert_eq!(
        page["items"][0]["summary"],
        "Sione Latu logged a $25.00 bank transfer gift to Missions"
    );
}

#[tokio::test]
async fn test_members_cannot_record_or_change_gifts() {
    let app = TestApp::new().await;
    let response = app
        .post_as(
            member_token(),
            "/api/v1/giving/contributions",
            json!({ "amount": 25, "fundId": ids::FUND_MISSIONS, "method": "cash" }),
        )
        .await;
    response.assert_forbidden();
    assert_eq!(response.error_message(), "Leader or Admin role required");

    let uri = "/api/v1/giving/contributions/contribution-2";
    app.put_as(member_token(), uri, json!({ "amount": 1 }))
        .await
        .assert_forbidden();
    let response = app.delete_as(member_token(), uri).await;
    response.assert_forbidden();
    assert_eq!(response.error_message(), "Cannot delete contribution");
    app.post_as(member_token(), &format!("{}/restore", uri), json!({}))
        .await
        .assert_forbidden();
    app.delete_as(member_token(), &format!("{}/permanent", uri))
        .await
        .assert_forbidden();
    app.delete_as(leader_token(), &format!("{}/permanent", uri))
        .await
        .assert_forbidden();
}

#[tokio::test]
async fn test_member_only_sees_own_gifts() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/giving/contributions?memberId={}", ids::MEMBER_2);
    let gifts: Vec<serde_json::Value> = app.get_as(member_token(), &uri).await.json();
    assert_eq!(gifts.len(), 1);
    assert_eq!(gifts[0]["id"], "contribution-1");
    assert_eq!(gifts[0]["memberId"], ids::MEMBER_1);

    app.get_as(member_token(), "/api/v1/giving/contributions/contribution-1")
        .await
        .assert_ok();
    let response = app
        .get_as(member_token(), "/api/v1/giving/contributions/contribution-2")
        .await;
    response.assert_forbidden();
    assert_eq!(response.error_message(), "You can only view your own contributions");

    let gifts: Vec<serde_json::Value> = app
        .get_as(leader_token(), "/api/v1/giving/contributions")
        .await
        .json();
    assert_eq!(gifts.len(), 2);
}

#[tokio::test]
async fn test_admin_records_gift_for_member() {
    let app = TestApp::new().await;
    let response = app
        .post_as(
            admin_token(),
            "/api/v1/giving/contributions",
            contribution_payload(ids::MEMBER_2, ids::FUND_GENERAL, 50.0),
        )
        .await;
    response.assert_created();

    let page: serde_json::Value = app
        .get_as(admin_token(), "/api/v1/audit-logs?entity=contribution&pageSize=1")
        .await
        .json();
    assert_eq!(
        page["items"][0]["summary"],
        "Ariana Matau recorded $50.00 eftpos gift for Tomas Perenise"
    );
}

#[tokio::test]
async fn test_gift_validation() {
    let app = TestApp::new().await;

    app.post_as(
        admin_token(),
        "/api/v1/giving/contributions",
        contribution_payload(ids::MEMBER_2, ids::FUND_GENERAL, 0.0),
    )
    .await
    .assert_unprocessable();

    let response = app
        .post_as(
            admin_token(),
            "/api/v1/giving/contributions",
            contribution_payload("user-nobody", ids::FUND_GENERAL, 10.0),
        )
        .await;
    response.assert_not_found();
    assert_eq!(response.error_message(), "User not found");
}

#[tokio::test]
async fn test_contribution_filters() {
    let app = TestApp::new().await;

    let uri = format!("/api/v1/giving/contributions?memberId={}", ids::MEMBER_2);
    let gifts: Vec<serde_json::Value> = app.get_as(admin_token(), &uri).await.json();
    assert_eq!(gifts.len(), 1);
    assert_eq!(gifts[0]["id"], "contribution-2");

    let uri = format!("/api/v1/giving/contributions?fundId={}", ids::FUND_GENERAL);
    let gifts: Vec<serde_json::Value> = app.get_as(admin_token(), &uri).await.json();
    assert_eq!(gifts.len(), 1);
    assert_eq!(gifts[0]["id"], "contribution-1");

    let gifts: Vec<serde_json::Value> = app
        .get_as(admin_token(), "/api/v1/giving/contributions?to=2000-01-01")
        .await
        .json();
    assert!(gifts.is_empty());

    // newest gift date first
    let gifts: Vec<serde_json::Value> = app
        .get_as(admin_token(), "/api/v1/giving/contributions")
        .await
        .json();
    assert_eq!(gifts[0]["id"], "contribution-2");
}

#[tokio::test]
async fn test_update_contribution_diff() {
    let app = TestApp::new().await;
    let uri = "/api/v1/giving/contributions/contribution-1";

    let updated: serde_json::Value = app
        .put_as(admin_token(), uri, json!({ "amount": 150, "note": null }))
        .await
        .json();
    assert_eq!(updated["amount"], 150.0);

    let page: serde_json::Value = app
        .get_as(admin_token(), "/api/v1/audit-logs?entityId=contribution-1")
        .await
        .json();
    let entry = &page["items"][0];
    assert_eq!(entry["action"], "contribution.updated");
    assert_eq!(entry["diff"]["amount"]["previous"], 120.0);
    assert_eq!(entry["diff"]["amount"]["newValue"], 150.0);
    assert!(entry["diff"]["note"]["newValue"].is_null());
}

#[tokio::test]
async fn test_contribution_soft_delete_and_restore() {
    let app = TestApp::new().await;
    let uri = "/api/v1/giving/contributions/contribution-2";

    app.delete_as(admin_token(), uri).await.assert_ok();
    let gifts: Vec<serde_json::Value> = app
        .get_as(admin_token(), "/api/v1/giving/contributions")
        .await
        .json();
    assert_eq!(gifts.len(), 1);

    // still addressable while deleted
    app.get_as(admin_token(), uri).await.assert_ok();

    app.post_as(admin_token(), &format!("{}/restore", uri), json!({}))
        .await
        .assert_ok();
    app.post_as(admin_token(), &format!("{}/restore", uri), json!({}))
        .await
        .assert_bad_request();

    app.delete_as(admin_token(), &format!("{}/permanent", uri))
        .await
        .assert_no_content();
    app.get_as(admin_token(), uri).await.assert_not_found();
}

#[tokio::test]
async fn test_giving_summary() {
    let app = TestApp::new().await;
    app.get_as(member_token(), "/api/v1/giving/summary")
        .await
        .assert_forbidden();
    app.get_as(leader_token(), "/api/v1/giving/summary")
        .await
        .assert_forbidden();
    let response = app.get_as(admin_token(), "/api/v1/giving/summary").await;

    response.assert_ok();
    let summary: serde_json::Value = response.json();
    assert_eq!(summary["totals"]["overall"], 160.0);
    assert_eq!(summary["totals"]["averageGift"], 80.0);

    let by_fund = summary["byFund"].as_array().unwrap();
    assert_eq!(by_fund.len(), 2);
    let general = by_fund
        .iter()
        .find(|f| f["fundId"] == ids::FUND_GENERAL)
        .unwrap();
    assert_eq!(general["name"], "General Offering");
    assert_eq!(general["amount"], 120.0);

    // seeded gifts may straddle a month boundary
    let monthly: f64 = summary["monthly"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["amount"].as_f64())
        .sum();
    assert_eq!(monthly, 160.0);
}
