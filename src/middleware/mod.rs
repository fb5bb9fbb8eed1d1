//! Middleware components
//!
//! This module contains middleware for:
//! - Authentication (session tokens)

pub mod auth;

pub use auth::{auth_middleware, AuthUser};
