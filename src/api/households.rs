//! Household API endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::{
    middleware::AuthUser,
    models::{Child, Household, HouseholdDetail, UpdateHouseholdRequest},
    utils::AppError,
    AppState,
};

const LEADER_REQUIRED: &str = "Admin or Leader role required";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_households))
        .route("/archived", get(list_archived_households))
        .route("/{id}", get(get_household).put(update_household))
        .route("/{id}/children", get(list_children))
        .route("/{id}/archive", post(archive_household))
        .route("/{id}/restore", post(restore_household))
}

async fn list_households(State(state): State<AppState>) -> Json<Vec<Household>> {
    Json(state.store.read().await.list_households())
}

/// Household with its members and registered children
async fn get_household(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HouseholdDetail>, AppError> {
    Ok(Json(state.store.read().await.get_household(&id)?))
}

/// Leaders may edit any household; members only their own
async fn update_household(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateHouseholdRequest>,
) -> Result<Json<HouseholdDetail>, AppError> {
    payload.validate()?;
    let mut store = state.store.write().await;
    if !store.belongs_to_household(&auth_user.id, &id) {
        auth_user.require_leader(LEADER_REQUIRED)?;
    }
    let household = store.update_household(&auth_user.id, &id, payload)?;
    Ok(Json(household))
}

async fn list_children(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Child>>, AppError> {
    Ok(Json(state.store.read().await.list_children(&id)?))
}

async fn list_archived_households(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Household>>, AppError> {
    auth_user.require_leader(LEADER_REQUIRED)?;
    Ok(Json(state.store.read().await.list_archived_households()))
}

async fn archive_household(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Household>, AppError> {
    auth_user.require_leader(LEADER_REQUIRED)?;
    let household = state
        .store
        .write()
        .await
        .archive_household(&auth_user.id, &id)?;
    Ok(Json(household))
}

async fn restore_household(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<HouseholdDetail>, AppError> {
    auth_user.require_leader(LEADER_REQUIRED)?;
    let household = state
        .store
        .write()
        .await
        .restore_household(&auth_user.id, &id)?;
    Ok(Json(household))
}
