//! Invitation API endpoints
//!
//! Creating and listing invitations needs a session. Looking an invitation up
//! by token and accepting it do not, since the invitee has no account yet.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::{
    middleware::AuthUser,
    models::{permissions, AcceptInvitationRequest, CreateInvitationRequest, Invitation},
    utils::AppError,
    AppState,
};

const ADMIN_REQUIRED: &str = "Admin role required to manage invitations";

/// Routes reachable without a session
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/token/{token}", get(get_invitation_by_token))
        .route("/accept", post(accept_invitation))
}

/// Routes that need a session
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/", get(list_invitations).post(create_invitation))
}

async fn list_invitations(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Invitation>>, AppError> {
    auth_user.require_permission(permissions::USERS_MANAGE, ADMIN_REQUIRED)?;
    Ok(Json(state.store.read().await.list_invitations()))
}

async fn create_invitation(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<Invitation>), AppError> {
    auth_user.require_permission(permissions::USERS_MANAGE, ADMIN_REQUIRED)?;
    payload.validate()?;
    let invitation = state
        .store
        .write()
        .await
        .create_invitation(&auth_user.id, payload)?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

async fn get_invitation_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Invitation>, AppError> {
    Ok(Json(state.store.read().await.get_invitation_by_token(&token)?))
}

async fn accept_invitation(
    State(state): State<AppState>,
    Json(payload): Json<AcceptInvitationRequest>,
) -> Result<Json<Invitation>, AppError> {
    let invitation = state
        .store
        .write()
        .await
        .accept_invitation(&payload.token)?;
    Ok(Json(invitation))
}
