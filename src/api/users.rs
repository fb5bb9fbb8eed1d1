//! Member directory API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::{
    middleware::AuthUser,
    models::{
        permissions, CreateUserRequest, UpdateUserRequest, UserListQuery, UserProfileView,
        UserView,
    },
    utils::AppError,
    AppState,
};

const ADMIN_REQUIRED: &str = "Admin role required to manage users";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/archived", get(list_archived_users))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/profile", get(get_user_profile))
        .route("/{id}/archive", post(archive_user))
        .route("/{id}/restore", post(restore_user))
}

/// List users, optionally filtered by `q` (name or email)
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Json<Vec<UserView>> {
    let store = state.store.read().await;
    Json(store.list_users(query.q.as_deref()))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserView>, AppError> {
    Ok(Json(state.store.read().await.get_user(&id)?))
}

async fn get_user_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserProfileView>, AppError> {
    Ok(Json(state.store.read().await.get_user_profile(&id)?))
}

async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserView>), AppError> {
    auth_user.require_permission(permissions::USERS_MANAGE, ADMIN_REQUIRED)?;
    payload.validate()?;

    let user = state
        .store
        .write()
        .await
        .create_user(&auth_user.id, payload)
        .map_err(|e| {
            tracing::warn!("Failed to create user: {}", e);
            AppError::from(e)
        })?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserView>, AppError> {
    auth_user.require_permission(permissions::USERS_MANAGE, ADMIN_REQUIRED)?;
    payload.validate()?;

    let user = state
        .store
        .write()
        .await
        .update_user(&auth_user.id, &id, payload)?;
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    auth_user.require_permission(permissions::USERS_MANAGE, ADMIN_REQUIRED)?;
    state.store.write().await.delete_user(&auth_user.id, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_archived_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<UserView>>, AppError> {
    auth_user.require_permission(permissions::USERS_MANAGE, ADMIN_REQUIRED)?;
    Ok(Json(state.store.read().await.list_archived_users()))
}

/// Hide a user from the directory without removing their history
async fn archive_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserView>, AppError> {
    auth_user.require_permission(permissions::USERS_MANAGE, ADMIN_REQUIRED)?;
    let user = state.store.write().await.archive_user(&auth_user.id, &id)?;
    Ok(Json(user))
}

async fn restore_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserView>, AppError> {
    auth_user.require_permission(permissions::USERS_MANAGE, ADMIN_REQUIRED)?;
    let user = state.store.write().await.restore_user(&auth_user.id, &id)?;
    Ok(Json(user))
}
