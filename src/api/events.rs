//! Event and attendance API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::{
    middleware::AuthUser,
    models::{
        permissions, AttendanceRecord, CreateEventRequest, Event, RecordAttendanceRequest, UpdateEventRequest,
    },
    utils::AppError,
    AppState,
};

const EVENT_ADMIN: &str = "Admin role required for event management";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/archived", get(list_archived_events))
        .route("/{id}", get(get_event).put(update_event).delete(delete_event))
        .route("/{id}/archive", post(archive_event))
        .route("/{id}/restore", post(restore_event))
        .route("/{id}/attendance", get(list_attendance).post(record_attendance))
}

/// Events in start order
async fn list_events(State(state): State<AppState>) -> Json<Vec<Event>> {
    Json(state.store.read().await.list_events())
}

async fn create_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    auth_user.require_permission(permissions::EVENTS_MANAGE, EVENT_ADMIN)?;
    payload.validate()?;
    let event = state
        .store
        .write()
        .await
        .create_event(&auth_user.id, payload)?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(state.store.read().await.get_event(&id)?))
}

async fn update_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<Event>, AppError> {
    auth_user.require_permission(permissions::EVENTS_MANAGE, EVENT_ADMIN)?;
    payload.validate()?;
    let event = state
        .store
        .write()
        .await
        .update_event(&auth_user.id, &id, payload)?;
    Ok(Json(event))
}

async fn delete_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    auth_user.require_permission(permissions::EVENTS_MANAGE, EVENT_ADMIN)?;
    state.store.write().await.delete_event(&auth_user.id, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let event = state.store.read().await.get_event(&id)?;
    Ok(Json(event.attendance))
}

/// Record attendance for the caller, or for `userId` when a leader takes the roll
async fn record_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<RecordAttendanceRequest>,
) -> Result<Json<AttendanceRecord>, AppError> {
    let attendee = payload.user_id.unwrap_or_else(|| auth_user.id.clone());
    if attendee != auth_user.id {
        auth_user.require_leader("Leader role required to record attendance for others")?;
    }
    let record = state.store.write().await.record_attendance(
        &id,
        &attendee,
        payload.status,
        payload.note,
        Some(auth_user.id.as_str()),
    )?;
    Ok(Json(record))
}

async fn list_archived_events(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Event>>, AppError> {
    auth_user.require_permission(permissions::EVENTS_MANAGE, EVENT_ADMIN)?;
    Ok(Json(state.store.read().await.list_archived_events()))
}

async fn archive_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    auth_user.require_permission(permissions::EVENTS_MANAGE, EVENT_ADMIN)?;
    Ok(Json(state.store.write().await.archive_event(&auth_user.id, &id)?))
}

async fn restore_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    auth_user.require_permission(permissions::EVENTS_MANAGE, EVENT_ADMIN)?;
    Ok(Json(state.store.write().await.restore_event(&auth_user.id, &id)?))
}
