//! Church settings API endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use validator::Validate;

use crate::{
    middleware::AuthUser,
    models::{permissions, Church, Settings, UpdateSettingsRequest},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(get_settings).put(update_settings))
}

#[derive(Debug, Serialize)]
struct SettingsResponse {
    church: Church,
    settings: Settings,
}

/// Church profile together with its onboarding settings
async fn get_settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    let mut store = state.store.write().await;
    let settings = store.get_settings();
    Json(SettingsResponse {
        church: store.church().clone(),
        settings,
    })
}

async fn update_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    auth_user.require_permission(
        permissions::SETTINGS_MANAGE,
        "Admin role required to update settings",
    )?;
    payload.validate()?;

    let mut store = state.store.write().await;
    let settings = store.update_settings(&auth_user.id, payload)?;
    Ok(Json(SettingsResponse {
        church: store.church().clone(),
        settings,
    }))
}
