//! Giving API endpoints
//!
//! Holders of `giving.manage` run funds and record gifts; the giver defaults
//! to the caller. Everyone else only sees their own contributions. `DELETE`
//! soft-deletes, `/restore` brings a record back and `/permanent` removes it
//! for good, which together with the summary is reserved for admins.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    middleware::AuthUser,
    models::{
        permissions, Contribution, ContributionFilter, CreateFundRequest, Fund, GivingSummary,
        RecordContributionRequest, UpdateContributionRequest, UpdateFundRequest,
    },
    utils::AppError,
    AppState,
};

const LEADER_REQUIRED: &str = "Leader or Admin role required";
const ADMIN_REQUIRED: &str = "Admin role required";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/funds", get(list_funds).post(create_fund))
        .route("/funds/{id}", put(update_fund).delete(delete_fund))
        .route("/funds/{id}/restore", post(restore_fund))
        .route("/funds/{id}/permanent", delete(hard_delete_fund))
        .route(
            "/contributions",
            get(list_contributions).post(record_contribution),
        )
        .route(
            "/contributions/{id}",
            get(get_contribution)
                .put(update_contribution)
                .delete(delete_contribution),
        )
        .route("/contributions/{id}/restore", post(restore_contribution))
        .route(
            "/contributions/{id}/permanent",
            delete(hard_delete_contribution),
        )
        .route("/summary", get(giving_summary))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FundListQuery {
    #[serde(default)]
    include_deleted: bool,
}

async fn list_funds(
    State(state): State<AppState>,
    Query(query): Query<FundListQuery>,
) -> Json<Vec<Fund>> {
    Json(state.store.read().await.list_funds(query.include_deleted))
}

async fn create_fund(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateFundRequest>,
) -> Result<(StatusCode, Json<Fund>), AppError> {
    auth_user.require_permission(permissions::GIVING_MANAGE, LEADER_REQUIRED)?;
    payload.validate()?;
    let fund = state
        .store
        .write()
        .await
        .create_fund(&auth_user.id, payload)?;
    Ok((StatusCode::CREATED, Json(fund)))
}

async fn update_fund(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateFundRequest>,
) -> Result<Json<Fund>, AppError> {
    auth_user.require_permission(permissions::GIVING_MANAGE, LEADER_REQUIRED)?;
    payload.validate()?;
    let fund = state
        .store
        .write()
        .await
        .update_fund(&auth_user.id, &id, payload)?;
    Ok(Json(fund))
}

async fn delete_fund(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Fund>, AppError> {
    auth_user.require_permission(permissions::GIVING_MANAGE, LEADER_REQUIRED)?;
    Ok(Json(state.store.write().await.delete_fund(&auth_user.id, &id)?))
}

async fn restore_fund(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Fund>, AppError> {
    auth_user.require_permission(permissions::GIVING_MANAGE, LEADER_REQUIRED)?;
    Ok(Json(state.store.write().await.restore_fund(&auth_user.id, &id)?))
}

async fn hard_delete_fund(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin(ADMIN_REQUIRED)?;
    state
        .store
        .write()
        .await
        .hard_delete_fund(&auth_user.id, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Live contributions, newest first
///
/// Callers without `giving.manage` are limited to their own gifts.
async fn list_contributions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(mut filter): Query<ContributionFilter>,
) -> Json<Vec<Contribution>> {
    if !auth_user.can(permissions::GIVING_MANAGE) {
        filter.member_id = Some(auth_user.id.clone());
    }
    Json(state.store.read().await.list_contributions(&filter))
}

async fn get_contribution(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Contribution>, AppError> {
    let contribution = state.store.read().await.get_contribution(&id)?;
    if contribution.member_id != auth_user.id && !auth_user.can(permissions::GIVING_MANAGE) {
        return Err(AppError::forbidden("You can only view your own contributions"));
    }
    Ok(Json(contribution))
}

async fn record_contribution(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<RecordContributionRequest>,
) -> Result<(StatusCode, Json<Contribution>), AppError> {
    auth_user.require_permission(permissions::GIVING_MANAGE, LEADER_REQUIRED)?;
    payload.validate()?;
    let contribution = state
        .store
        .write()
        .await
        .record_contribution(&auth_user.id, payload)?;
    Ok((StatusCode::CREATED, Json(contribution)))
}

async fn update_contribution(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateContributionRequest>,
) -> Result<Json<Contribution>, AppError> {
    auth_user.require_permission(permissions::GIVING_MANAGE, LEADER_REQUIRED)?;
    payload.validate()?;
    let contribution = state
        .store
        .write()
        .await
        .update_contribution(&auth_user.id, &id, payload)?;
    Ok(Json(contribution))
}

async fn delete_contribution(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Contribution>, AppError> {
    auth_user.require_permission(permissions::GIVING_MANAGE, "Cannot delete contribution")?;
    let contribution = state
        .store
        .write()
        .await
        .delete_contribution(&auth_user.id, &id)?;
    Ok(Json(contribution))
}

async fn restore_contribution(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Contribution>, AppError> {
    auth_user.require_permission(permissions::GIVING_MANAGE, LEADER_REQUIRED)?;
    let contribution = state
        .store
        .write()
        .await
        .restore_contribution(&auth_user.id, &id)?;
    Ok(Json(contribution))
}

async fn hard_delete_contribution(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin(ADMIN_REQUIRED)?;
    state
        .store
        .write()
        .await
        .hard_delete_contribution(&auth_user.id, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn giving_summary(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<GivingSummary>, AppError> {
    auth_user.require_admin(ADMIN_REQUIRED)?;
    Ok(Json(state.store.read().await.giving_summary()))
}
