//! Session Token Authentication Middleware
//!
//! Demo logins hand out opaque session tokens. Clients may present them as a
//! bearer token, an `X-Session-Token` header or the `session_token` cookie.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::{
    models::{system_roles, UserStatus, UserView},
    utils::{error::ErrorResponse, AppError},
    AppState,
};

pub const SESSION_HEADER: &str = "X-Session-Token";
pub const SESSION_COOKIE: &str = "session_token";

/// Authenticated user resolved from a session token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Slugs of every role the user holds
    pub role_slugs: Vec<String>,
    /// Union of the permissions granted by those roles
    pub permissions: Vec<String>,
    /// Token the request was authenticated with
    pub token: String,
}

impl AuthUser {
    pub fn from_view(user: &UserView, token: impl Into<String>) -> Self {
        let role_slugs = user.roles.iter().filter_map(|r| r.slug.clone()).collect();
        let mut permissions: Vec<String> = user
            .roles
            .iter()
            .flat_map(|r| r.permissions.iter().cloned())
            .collect();
        permissions.sort();
        permissions.dedup();

        let name = format!("{} {}", user.profile.first_name, user.profile.last_name)
            .trim()
            .to_string();
        Self {
            id: user.id.clone(),
            email: user.primary_email.clone(),
            name,
            role_slugs,
            permissions,
            token: token.into(),
        }
    }

    pub fn has_role(&self, slug: &str) -> bool {
        self.role_slugs.iter().any(|r| r == slug)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(system_roles::ADMIN)
    }

    /// Admins count as leaders
    pub fn is_leader(&self) -> bool {
        self.is_admin() || self.has_role(system_roles::LEADER)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Admins may do anything; everyone else needs the permission granted
    pub fn can(&self, permission: &str) -> bool {
        self.is_admin() || self.has_permission(permission)
    }

    /// Fails with 403 and `message` unless the user holds the admin role
    pub fn require_admin(&self, message: &str) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden(message))
        }
    }

    /// Fails with 403 and `message` unless the user is a leader or admin
    pub fn require_leader(&self, message: &str) -> Result<(), AppError> {
        if self.is_leader() {
            Ok(())
        } else {
            Err(AppError::forbidden(message))
        }
    }

    /// Fails with 403 and `message` unless [`AuthUser::can`] allows `permission`
    pub fn require_permission(&self, permission: &str, message: &str) -> Result<(), AppError> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(AppError::forbidden(message))
        }
    }
}

/// Extractor for AuthUser from request extensions
///
/// This allows using AuthUser as a handler parameter after auth middleware has run.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("unauthorized", "Authentication required")),
            )
        })
    }
}

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    InactiveAccount,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Missing session token",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Invalid or expired session",
            ),
            AuthError::InactiveAccount => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Account is not active yet. Ask an administrator to activate it.",
            ),
        };

        (status, Json(ErrorResponse::new(error, message))).into_response()
    }
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
}

/// Find the session token in the request, header sources first
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
    {
        return Some(token.trim().to_string());
    }

    if let Some(token) = headers.get(SESSION_HEADER).and_then(|h| h.to_str().ok()) {
        return Some(token.trim().to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

/// Authentication middleware
///
/// Resolves the session token against the store and injects the AuthUser
/// into request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_session_token(request.headers())
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let user = {
        let store = state.store.read().await;
        store.session_user(&token)
    }
    .ok_or_else(|| {
        debug!("Rejected unknown session token");
        AuthError::InvalidToken
    })?;

    if user.status != UserStatus::Active {
        return Err(AuthError::InactiveAccount);
    }

    request
        .extensions_mut()
        .insert(AuthUser::from_view(&user, token));

    Ok(next.run(request).await)
}
