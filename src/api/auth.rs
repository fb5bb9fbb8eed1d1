//! Authentication API endpoints
//!
//! Demo sign-in against the seeded directory. The session token is returned
//! in the body and also set as the `session_token` cookie.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use validator::Validate;

use crate::{
    middleware::{auth::SESSION_COOKIE, AuthUser},
    models::{DemoLoginRequest, LoginResponse, UserView},
    utils::AppError,
    AppState,
};

/// Routes reachable without a session
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/demo-login", post(demo_login))
}

/// Routes that need a session
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/logout", post(logout))
}

#[derive(Debug, Serialize)]
struct MeResponse {
    user: UserView,
    permissions: Vec<String>,
}

async fn demo_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<DemoLoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    payload.validate()?;

    let login = state.store.write().await.create_session(
        payload.email.trim(),
        payload.provider,
        payload.role.as_deref(),
    )?;

    let cookie = Cookie::build((SESSION_COOKIE, login.session.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((jar.add(cookie), Json(login)))
}

async fn me(State(state): State<AppState>, auth_user: AuthUser) -> Result<Json<MeResponse>, AppError> {
    let user = state.store.read().await.get_user(&auth_user.id)?;
    Ok(Json(MeResponse {
        user,
        permissions: auth_user.permissions,
    }))
}

async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    let revoked = state.store.write().await.revoke_session(&auth_user.token);
    if revoked {
        tracing::info!(user_id = %auth_user.id, "Session revoked");
    }
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        StatusCode::NO_CONTENT,
    )
}
