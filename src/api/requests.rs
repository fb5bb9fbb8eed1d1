//! Request type and member request API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    middleware::AuthUser,
    models::{
        permissions, CreateMemberRequest, CreateRequestTypeRequest, MemberRequest,
        ReorderRequestTypesRequest, RequestType, UpdateMemberRequest, UpdateRequestTypeRequest,
        UpdateRequestTypeStatusRequest,
    },
    utils::AppError,
    AppState,
};

const ADMIN_REQUIRED: &str = "Admin role required to manage request types";
const LEADER_REQUIRED: &str = "Leader or Admin role required";

pub fn request_type_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_request_types).post(create_request_type))
        .route("/reorder", post(reorder_request_types))
        .route("/{id}", put(update_request_type))
        .route("/{id}/archive", post(archive_request_type))
        .route("/{id}/status", put(update_request_type_status))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests).post(create_request))
        .route("/{id}", get(get_request).put(update_request))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestTypeQuery {
    #[serde(default)]
    include_archived: bool,
}

/// Archived types are only listed for request type managers
async fn list_request_types(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<RequestTypeQuery>,
) -> Json<Vec<RequestType>> {
    let include_archived = query.include_archived && auth_user.can(permissions::SETTINGS_MANAGE);
    Json(state.store.read().await.list_request_types(include_archived))
}

async fn create_request_type(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateRequestTypeRequest>,
) -> Result<(StatusCode, Json<RequestType>), AppError> {
    auth_user.require_permission(permissions::SETTINGS_MANAGE, ADMIN_REQUIRED)?;
    payload.validate()?;
    let request_type = state
        .store
        .write()
        .await
        .create_request_type(&auth_user.id, payload)?;
    Ok((StatusCode::CREATED, Json(request_type)))
}

async fn update_request_type(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRequestTypeRequest>,
) -> Result<Json<RequestType>, AppError> {
    auth_user.require_permission(permissions::SETTINGS_MANAGE, ADMIN_REQUIRED)?;
    payload.validate()?;
    let request_type = state
        .store
        .write()
        .await
        .update_request_type(&auth_user.id, &id, payload)?;
    Ok(Json(request_type))
}

async fn archive_request_type(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<RequestType>, AppError> {
    auth_user.require_permission(permissions::SETTINGS_MANAGE, ADMIN_REQUIRED)?;
    let request_type = state
        .store
        .write()
        .await
        .archive_request_type(&auth_user.id, &id)?;
    Ok(Json(request_type))
}

async fn update_request_type_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRequestTypeStatusRequest>,
) -> Result<Json<RequestType>, AppError> {
    auth_user.require_permission(permissions::SETTINGS_MANAGE, ADMIN_REQUIRED)?;
    let request_type = state
        .store
        .write()
        .await
        .update_request_type_status(&auth_user.id, &id, payload.status)?;
    Ok(Json(request_type))
}

async fn reorder_request_types(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<ReorderRequestTypesRequest>,
) -> Result<Json<Vec<RequestType>>, AppError> {
    auth_user.require_permission(permissions::SETTINGS_MANAGE, ADMIN_REQUIRED)?;
    let request_types = state
        .store
        .write()
        .await
        .reorder_request_types(&auth_user.id, &payload.ids)?;
    Ok(Json(request_types))
}

/// Leaders see every request; members only their own
async fn list_requests(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Json<Vec<MemberRequest>> {
    let owner = (!auth_user.is_leader()).then_some(auth_user.id.as_str());
    Json(state.store.read().await.list_requests(owner))
}

async fn get_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MemberRequest>, AppError> {
    let request = state.store.read().await.get_request(&id)?;
    if request.user_id != auth_user.id && !auth_user.is_leader() {
        return Err(AppError::forbidden("You can only view your own requests"));
    }
    Ok(Json(request))
}

async fn create_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<MemberRequest>), AppError> {
    payload.validate()?;
    let request = state
        .store
        .write()
        .await
        .create_request(&auth_user.id, payload)?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn update_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMemberRequest>,
) -> Result<Json<MemberRequest>, AppError> {
    auth_user.require_leader(LEADER_REQUIRED)?;
    let request = state
        .store
        .write()
        .await
        .update_request(&auth_user.id, &id, payload)?;
    Ok(Json(request))
}
