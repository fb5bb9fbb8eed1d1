//! Children's ministry check-in API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use validator::Validate;

use crate::{
    middleware::AuthUser,
    models::{
        permissions, Checkin, CheckinFilter, CheckinView, Child, CreateCheckinRequest, CreateChildRequest,
        UpdateCheckinRequest, UpdateChildRequest,
    },
    utils::AppError,
    AppState,
};

const LEADER_REQUIRED: &str = "Admin or Leader role required";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/children", post(create_child))
        .route(
            "/children/{id}",
            get(get_child).put(update_child).delete(delete_child),
        )
        .route("/children/{id}/restore", post(restore_child))
        .route("/checkins", get(list_checkins).post(create_checkin))
        .route("/checkins/{id}", put(update_checkin))
}

/// Check-in staff may register any child; parents only into their own household
async fn create_child(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateChildRequest>,
) -> Result<(StatusCode, Json<Child>), AppError> {
    payload.validate()?;
    let mut store = state.store.write().await;
    if !store.belongs_to_household(&auth_user.id, &payload.household_id) {
        auth_user.require_permission(permissions::CHECKIN_MANAGE, LEADER_REQUIRED)?;
    }
    let child = store.create_child(&auth_user.id, payload)?;
    Ok((StatusCode::CREATED, Json(child)))
}

async fn get_child(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Child>, AppError> {
    Ok(Json(state.store.read().await.get_child(&id)?))
}

async fn update_child(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateChildRequest>,
) -> Result<Json<Child>, AppError> {
    payload.validate()?;
    let mut store = state.store.write().await;
    if !store.is_guardian_of(&auth_user.id, &id) {
        auth_user.require_permission(permissions::CHECKIN_MANAGE, LEADER_REQUIRED)?;
    }
    let child = store.update_child(&auth_user.id, &id, payload)?;
    Ok(Json(child))
}

async fn delete_child(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Child>, AppError> {
    auth_user.require_permission(permissions::CHECKIN_MANAGE, LEADER_REQUIRED)?;
    Ok(Json(state.store.write().await.delete_child(&auth_user.id, &id)?))
}

async fn restore_child(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Child>, AppError> {
    auth_user.require_permission(permissions::CHECKIN_MANAGE, LEADER_REQUIRED)?;
    Ok(Json(state.store.write().await.restore_child(&auth_user.id, &id)?))
}

/// Check-ins with their child, filtered by event and status
async fn list_checkins(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filter): Query<CheckinFilter>,
) -> Result<Json<Vec<CheckinView>>, AppError> {
    auth_user.require_permission(permissions::CHECKIN_MANAGE, LEADER_REQUIRED)?;
    Ok(Json(state.store.read().await.list_checkins(&filter)))
}

/// Parents may open a check-in for their own children
async fn create_checkin(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateCheckinRequest>,
) -> Result<(StatusCode, Json<Checkin>), AppError> {
    let mut store = state.store.write().await;
    if !store.is_guardian_of(&auth_user.id, &payload.child_id) {
        auth_user.require_permission(permissions::CHECKIN_MANAGE, LEADER_REQUIRED)?;
    }
    let checkin = store.create_checkin(&auth_user.id, payload)?;
    Ok((StatusCode::CREATED, Json(checkin)))
}

async fn update_checkin(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCheckinRequest>,
) -> Result<Json<Checkin>, AppError> {
    auth_user.require_permission(permissions::CHECKIN_MANAGE, LEADER_REQUIRED)?;
    let checkin = state
        .store
        .write()
        .await
        .update_checkin(&auth_user.id, &id, payload)?;
    Ok(Json(checkin))
}
