//! API integration tests
//!
//! Health, sign-in, settings and dashboard endpoints exercised through the
//! full router.

use axum::{body::Body, http::Request};
use serde_json::json;

use crate::common::{admin_token, member_token, TestApp, UserFixtures};

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/health").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_detailed_health_endpoint() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/health/detailed").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["church_id"], "church-acc");
    assert_eq!(json["components"]["store"]["status"], "healthy");
    // persistence is off in tests
    assert_eq!(json["components"]["audit_log"]["status"], "not_configured");
}

#[tokio::test]
async fn test_liveness_and_readiness_probes() {
    let app = TestApp::new().await;
    app.get("/api/v1/health/live").await.assert_ok();
    app.get("/api/v1/health/ready").await.assert_ok();
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/users").await;

    response.assert_unauthorized();
    assert_eq!(response.error_message(), "Missing session token");
}

#[tokio::test]
async fn test_unknown_session_token_is_rejected() {
    let app = TestApp::new().await;
    let response = app.get_as("not-a-real-token", "/api/v1/users").await;

    response.assert_unauthorized();
}

#[tokio::test]
async fn test_demo_login_returns_token_and_cookie() {
    let app = TestApp::new().await;
    let member = UserFixtures::member_without_session();
    let response = app
        .post_json("/api/v1/auth/demo-login", json!({ "email": member.email }))
        .await;

    response.assert_ok();
    let body: serde_json::Value = response.json();
    let token = body["session"]["token"].as_str().unwrap().to_string();
    assert_eq!(body["session"]["provider"], "demo");
    assert_eq!(body["user"]["id"], member.id);
    assert!(body["user"]["lastLoginAt"].is_string());

    let cookie = response
        .headers
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with(&format!("session_token={}", token)));
    assert!(cookie.contains("HttpOnly"));

    let me = app.get_as(&token, "/api/v1/auth/me").await;
    me.assert_ok();
    let me: serde_json::Value = me.json();
    assert_eq!(me["user"]["primaryEmail"], member.email);
}

#[tokio::test]
async fn test_demo_login_unknown_email() {
    let app = TestApp::new().await;
    let response = app
        .post_json(
            "/api/v1/auth/demo-login",
            json!({ "email": "stranger@example.com", "provider": "google" }),
        )
        .await;

    response.assert_not_found();
    assert_eq!(
        response.error_message(),
        "User not found for demo login. Use one of the seeded accounts."
    );
}

#[tokio::test]
async fn test_demo_login_rejects_malformed_email() {
    let app = TestApp::new().await;
    let response = app
        .post_json("/api/v1/auth/demo-login", json!({ "email": "not-an-email" }))
        .await;

    response.assert_unprocessable();
}

#[tokio::test]
async fn test_demo_login_can_grant_role() {
    let app = TestApp::new().await;
    let response = app
        .post_json(
            "/api/v1/auth/demo-login",
            json!({ "email": "member2@example.com", "role": "leader" }),
        )
        .await;

    response.assert_ok();
    let body: serde_json::Value = response.json();
    let slugs: Vec<&str> = body["user"]["roles"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["slug"].as_str())
        .collect();
    assert!(slugs.contains(&"leader"));
    assert!(slugs.contains(&"member"));
}

#[tokio::test]
async fn test_session_token_header_and_cookie_sources() {
    let app = TestApp::new().await;

    let by_header = Request::builder()
        .uri("/api/v1/auth/me")
        .header("X-Session-Token", member_token())
        .body(Body::empty())
        .unwrap();
    app.request(by_header).await.assert_ok();

    let by_cookie = Request::builder()
        .uri("/api/v1/auth/me")
        .header("Cookie", format!("session_token={}", admin_token()))
        .body(Body::empty())
        .unwrap();
    let response = app.request(by_cookie).await;
    response.assert_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["id"], UserFixtures::admin().id);
    assert!(body["permissions"]
        .as_array()
        .unwrap()
        .contains(&json!("audit.view")));
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let app = TestApp::new().await;

    let response = app
        .post_as(member_token(), "/api/v1/auth/logout", json!({}))
        .await;
    response.assert_no_content();

    app.get_as(member_token(), "/api/v1/auth/me")
        .await
        .assert_unauthorized();
}

#[tokio::test]
async fn test_inactive_account_is_forbidden() {
    let app = TestApp::new().await;
    app.post_as(
        admin_token(),
        "/api/v1/users",
        json!({
            "primaryEmail": "invitee@example.com",
            "firstName": "Iosefa",
            "lastName": "Tui",
            "status": "invited",
        }),
    )
    .await
    .assert_created();

    let login = app
        .post_json(
            "/api/v1/auth/demo-login",
            json!({ "email": "invitee@example.com" }),
        )
        .await;
    login.assert_ok();
    let token = login.json::<serde_json::Value>()["session"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app.get_as(&token, "/api/v1/dashboard").await;
    response.assert_forbidden();
    assert!(response.error_message().starts_with("Account is not active yet"));
}

#[tokio::test]
async fn test_dashboard_snapshot() {
    let app = TestApp::new().await;
    let response = app.get_as(member_token(), "/api/v1/dashboard").await;

    response.assert_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["memberCount"], 5);
    assert_eq!(body["groupCount"], 3);
    assert_eq!(body["upcomingEvents"], 3);
    assert_eq!(body["totalGivingLast30"], 160.0);
}

#[tokio::test]
async fn test_settings_read_by_anyone_written_by_admin() {
    let app = TestApp::new().await;

    let response = app.get_as(member_token(), "/api/v1/settings").await;
    response.assert_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["church"]["name"], "Auckland Community Church");
    assert_eq!(body["settings"]["onboardingComplete"], false);

    app.put_as(
        member_token(),
        "/api/v1/settings",
        json!({ "onboardingComplete": true }),
    )
    .await
    .assert_forbidden();

    let before = app.audit_len().await;
    let response = app
        .put_as(
            admin_token(),
            "/api/v1/settings",
            json!({ "onboardingComplete": true, "brandColor": "#0a7" }),
        )
        .await;
    response.assert_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["settings"]["brandColor"], "#0a7");
    assert_eq!(app.audit_len().await, before + 1);
}

#[tokio::test]
async fn test_settings_rejects_bad_brand_color() {
    let app = TestApp::new().await;
    let response = app
        .put_as(
            admin_token(),
            "/api/v1/settings",
            json!({ "brandColor": "teal" }),
        )
        .await;

    response.assert_bad_request();
}
