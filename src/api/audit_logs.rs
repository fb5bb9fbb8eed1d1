//! Audit log API endpoints

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::{
    middleware::AuthUser,
    models::{permissions, AuditLogFilter, AuditLogPage},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_audit_logs))
}

async fn list_audit_logs(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filter): Query<AuditLogFilter>,
) -> Result<Json<AuditLogPage>, AppError> {
    auth_user.require_permission(
        permissions::AUDIT_VIEW,
        "Admin role required to view audit logs",
    )?;

    let page = state.store.read().await.list_audit_logs(&filter);
    Ok(Json(page))
}
