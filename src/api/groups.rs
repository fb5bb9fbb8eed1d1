//! Ministry group API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use validator::Validate;

use crate::{
    middleware::AuthUser,
    models::{
        permissions, AddGroupMemberRequest, CreateGroupRequest, Group, GroupMember, GroupMemberView,
        UpdateGroupMemberRequest, UpdateGroupRequest,
    },
    utils::AppError,
    AppState,
};

const GROUP_ADMIN: &str = "Admin role required for group management";
const MEMBERSHIP_ADMIN: &str = "Admin role required for membership management";

/// Create routes for group endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_groups).post(create_group))
        .route("/archived", get(list_archived_groups))
        .route("/{id}", get(get_group).put(update_group).delete(delete_group))
        .route("/{id}/archive", post(archive_group))
        .route("/{id}/restore", post(restore_group))
        .route("/{id}/members", get(list_members).post(add_member))
        .route(
            "/{id}/members/{user_id}",
            put(update_member).delete(remove_member),
        )
}

async fn list_groups(State(state): State<AppState>) -> Json<Vec<Group>> {
    Json(state.store.read().await.list_groups())
}

async fn create_group(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), AppError> {
    auth_user.require_permission(permissions::GROUPS_MANAGE, GROUP_ADMIN)?;
    payload.validate()?;
    let group = state
        .store
        .write()
        .await
        .create_group(&auth_user.id, payload)?;
    Ok((StatusCode::CREATED, Json(group)))
}

async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Group>, AppError> {
    Ok(Json(state.store.read().await.get_group(&id)?))
}

async fn update_group(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateGroupRequest>,
) -> Result<Json<Group>, AppError> {
    auth_user.require_permission(permissions::GROUPS_MANAGE, GROUP_ADMIN)?;
    payload.validate()?;
    let group = state
        .store
        .write()
        .await
        .update_group(&auth_user.id, &id, payload)?;
    Ok(Json(group))
}

/// Delete a group; events and announcements pointing at it are detached
async fn delete_group(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    auth_user.require_permission(permissions::GROUPS_MANAGE, GROUP_ADMIN)?;
    state.store.write().await.delete_group(&auth_user.id, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_members(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<GroupMemberView>>, AppError> {
    Ok(Json(state.store.read().await.list_group_members(&id)?))
}

async fn add_member(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<AddGroupMemberRequest>,
) -> Result<(StatusCode, Json<GroupMember>), AppError> {
    auth_user.require_permission(permissions::GROUPS_MANAGE, MEMBERSHIP_ADMIN)?;
    let member = state
        .store
        .write()
        .await
        .add_group_member(&auth_user.id, &id, payload)?;
    Ok((StatusCode::CREATED, Json(member)))
}

async fn update_member(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, user_id)): Path<(String, String)>,
    Json(payload): Json<UpdateGroupMemberRequest>,
) -> Result<Json<GroupMember>, AppError> {
    auth_user.require_permission(permissions::GROUPS_MANAGE, MEMBERSHIP_ADMIN)?;
    let member = state
        .store
        .write()
        .await
        .update_group_member(&auth_user.id, &id, &user_id, payload)?;
    Ok(Json(member))
}

async fn remove_member(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    auth_user.require_permission(permissions::GROUPS_MANAGE, MEMBERSHIP_ADMIN)?;
    state
        .store
        .write()
        .await
        .remove_group_member(&auth_user.id, &id, &user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_archived_groups(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Group>>, AppError> {
    auth_user.require_permission(permissions::GROUPS_MANAGE, GROUP_ADMIN)?;
    Ok(Json(state.store.read().await.list_archived_groups()))
}

async fn archive_group(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Group>, AppError> {
    auth_user.require_permission(permissions::GROUPS_MANAGE, GROUP_ADMIN)?;
    Ok(Json(state.store.write().await.archive_group(&auth_user.id, &id)?))
}

async fn restore_group(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Group>, AppError> {
    auth_user.require_permission(permissions::GROUPS_MANAGE, GROUP_ADMIN)?;
    Ok(Json(state.store.write().await.restore_group(&auth_user.id, &id)?))
}
