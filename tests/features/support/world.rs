//! Test world for Cucumber scenarios

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use cucumber::World;
use tower::ServiceExt;

use congregate::{api, config::AppConfig, AppState, SharedStore};

/// Test world that maintains state across scenario steps
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct TestWorld {
    /// Router over a freshly seeded store
    pub router: Router,

    /// Handle on the same store for direct assertions
    pub store: SharedStore,

    /// Session token sent with requests
    pub auth_token: Option<String>,

    /// Audit trail length when the scenario started
    pub audit_baseline: usize,

    /// Response from last API call
    pub last_response: Option<TestResponse>,
}

#[derive(Debug, Clone)]
pub struct TestResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl TestWorld {
    /// Create a world around a seeded, non-persisting store
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.audit.persist = false;
        let state = AppState::new(config);

        let router = Router::new()
            .nest("/api/v1", api::public_routes())
            .nest(
                "/api/v1",
                api::protected_routes().layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    congregate::middleware::auth::auth_middleware,
                )),
            )
            .with_state(state.clone());

        let audit_baseline = state
            .store
            .try_read()
            .map(|store| store.audit_log().len())
            .unwrap_or_default();

        Self {
            router,
            store: state.store,
            auth_token: None,
            audit_baseline,
            last_response: None,
        }
    }

    /// Sign in with one of the seeded sessions
    pub fn sign_in_as(&mut self, who: &str) {
        let token = match who {
            "admin" => "demo-admin",
            "leader" => "demo-leader",
            "member" => "demo-member",
            other => panic!("Unknown seeded user: {}", other),
        };
        self.auth_token = Some(token.to_string());
    }

    /// Send a request and keep the response for later steps
    pub async fn send(&mut self, method: Method, uri: &str, body: Option<serde_json::Value>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = &self.auth_token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        self.last_response = Some(TestResponse { status, body });
    }

    pub fn response(&self) -> &TestResponse {
        self.last_response.as_ref().expect("No response available")
    }

    pub async fn audit_len(&self) -> usize {
        self.store.read().await.audit_log().len()
    }
}
