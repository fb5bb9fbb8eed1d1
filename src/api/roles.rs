//! Role management API endpoints

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::{
    middleware::AuthUser,
    models::{
        permissions, CreateRoleRequest, DeleteRoleRequest, RoleDeletion, RoleView,
        UpdateRoleRequest,
    },
    utils::AppError,
    AppState,
};

const ADMIN_REQUIRED: &str = "Admin role required to manage roles";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/{id}", get(get_role).put(update_role).delete(delete_role))
}

async fn list_roles(State(state): State<AppState>) -> Json<Vec<RoleView>> {
    Json(state.store.read().await.list_roles())
}

async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RoleView>, AppError> {
    Ok(Json(state.store.read().await.get_role(&id)?))
}

async fn create_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<RoleView>), AppError> {
    auth_user.require_permission(permissions::ROLES_MANAGE, ADMIN_REQUIRED)?;
    payload.validate()?;
    let role = state
        .store
        .write()
        .await
        .create_role(&auth_user.id, payload)?;
    Ok((StatusCode::CREATED, Json(role)))
}

async fn update_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<RoleView>, AppError> {
    auth_user.require_permission(permissions::ROLES_MANAGE, ADMIN_REQUIRED)?;
    payload.validate()?;
    let role = state
        .store
        .write()
        .await
        .update_role(&auth_user.id, &id, payload)?;
    Ok(Json(role))
}

/// Delete a role
///
/// `reassignRoleId` may come from the query string or a JSON body; the body
/// wins when both are present.
async fn delete_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Query(query): Query<DeleteRoleRequest>,
    body: Bytes,
) -> Result<Json<RoleDeletion>, AppError> {
    auth_user.require_permission(permissions::ROLES_MANAGE, ADMIN_REQUIRED)?;

    let from_body = if body.iter().all(u8::is_ascii_whitespace) {
        DeleteRoleRequest::default()
    } else {
        serde_json::from_slice::<DeleteRoleRequest>(&body)?
    };
    let reassign = from_body.reassign_role_id.or(query.reassign_role_id);

    let result = state
        .store
        .write()
        .await
        .delete_role(&auth_user.id, &id, reassign.as_deref())?;
    Ok(Json(result))
}
