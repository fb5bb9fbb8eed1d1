//! API routes and handlers
//!
//! This module defines all API endpoints and their routing.

use axum::{routing::get, Router};

use crate::AppState;

mod announcements;
mod audit_logs;
mod auth;
mod checkin;
mod dashboard;
mod events;
mod giving;
mod groups;
mod health;
mod households;
mod invitations;
mod requests;
mod roles;
mod settings;
mod users;

pub use health::*;

/// Public API routes (no authentication required)
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // Health check endpoints
        .route("/health", get(health::health_check))
        .route("/health/detailed", get(health::health_check_detailed))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        // Demo sign-in
        .nest("/auth", auth::public_routes())
        // Invitation lookup and acceptance
        .nest("/invitations", invitations::public_routes())
}

/// Protected API routes (session token required)
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::protected_routes())
        // Directory
        .nest("/users", users::routes())
        .nest("/households", households::routes())
        .nest("/roles", roles::routes())
        .nest("/invitations", invitations::protected_routes())
        // Ministry
        .nest("/groups", groups::routes())
        .nest("/events", events::routes())
        .nest("/announcements", announcements::routes())
        .nest("/checkin", checkin::routes())
        // Member requests
        .nest("/request-types", requests::request_type_routes())
        .nest("/requests", requests::routes())
        // Giving
        .nest("/giving", giving::routes())
        // Administration
        .nest("/audit-logs", audit_logs::routes())
        .nest("/settings", settings::routes())
        .nest("/dashboard", dashboard::routes())
}

/// Create the full API router (public + protected; useful for tests)
pub fn routes() -> Router<AppState> {
    public_routes().merge(protected_routes())
}
