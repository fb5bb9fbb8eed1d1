//! Dashboard API endpoint

use axum::{extract::State, routing::get, Json, Router};

use crate::{models::DashboardSnapshot, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

async fn dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.store.read().await.dashboard_snapshot())
}
