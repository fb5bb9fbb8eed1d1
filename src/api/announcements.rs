//! Announcement API endpoints

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
        permissions, AnnouncementRead, AnnouncementView, CreateAnnouncementRequest, UpdateAnnouncementRequest,
    },
    utils::AppError,
    AppState,
};

const ANNOUNCEMENT_ADMIN: &str = "Admin role required for announcement management";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_announcements).post(create_announcement))
        .route("/archived", get(list_archived_announcements))
        .route(
            "/{id}",
            get(get_announcement)
                .put(update_announcement)
                .delete(delete_announcement),
        )
        .route("/{id}/read", post(mark_read))
        .route("/{id}/archive", post(archive_announcement))
        .route("/{id}/restore", post(restore_announcement))
}

async fn list_announcements(State(state): State<AppState>) -> Json<Vec<AnnouncementView>> {
    Json(state.store.read().await.list_announcements())
}

async fn create_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<AnnouncementView>), AppError> {
    auth_user.require_permission(permissions::ANNOUNCEMENTS_MANAGE, ANNOUNCEMENT_ADMIN)?;
    payload.validate()?;
    let announcement = state
        .store
        .write()
        .await
        .create_announcement(&auth_user.id, payload)?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

async fn get_announcement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AnnouncementView>, AppError> {
    Ok(Json(state.store.read().await.get_announcement(&id)?))
}

async fn update_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAnnouncementRequest>,
) -> Result<Json<AnnouncementView>, AppError> {
    auth_user.require_permission(permissions::ANNOUNCEMENTS_MANAGE, ANNOUNCEMENT_ADMIN)?;
    payload.validate()?;
    let announcement = state
        .store
        .write()
        .await
        .update_announcement(&auth_user.id, &id, payload)?;
    Ok(Json(announcement))
}

async fn delete_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    auth_user.require_permission(permissions::ANNOUNCEMENTS_MANAGE, ANNOUNCEMENT_ADMIN)?;
    state
        .store
        .write()
        .await
        .delete_announcement(&auth_user.id, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark the announcement read by the caller
async fn mark_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<AnnouncementRead>, AppError> {
    let read = state
        .store
        .write()
        .await
        .mark_announcement_read(&id, &auth_user.id)?;
    Ok(Json(read))
}

async fn list_archived_announcements(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<AnnouncementView>>, AppError> {
    auth_user.require_permission(permissions::ANNOUNCEMENTS_MANAGE, ANNOUNCEMENT_ADMIN)?;
    Ok(Json(state.store.read().await.list_archived_announcements()))
}

async fn archive_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<AnnouncementView>, AppError> {
    auth_user.require_permission(permissions::ANNOUNCEMENTS_MANAGE, ANNOUNCEMENT_ADMIN)?;
    let announcement = state
        .store
        .write()
        .await
        .archive_announcement(&auth_user.id, &id)?;
    Ok(Json(announcement))
}

async fn restore_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<AnnouncementView>, AppError> {
    auth_user.require_permission(permissions::ANNOUNCEMENTS_MANAGE, ANNOUNCEMENT_ADMIN)?;
    let announcement = state
        .store
        .write()
        .await
        .restore_announcement(&auth_user.id, &id)?;
    Ok(Json(announcement))
}
