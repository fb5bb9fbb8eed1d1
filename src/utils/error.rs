//! Error types and handling
//!
//! Two layers live here. `StoreError` is what the in-memory data store
//! returns when a business rule or lookup fails; `AppError` is what handlers
//! return, and it renders every failure as a consistent JSON body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failures raised by data store operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Another user already owns the email (case-insensitive)
    #[error("A user with that email already exists")]
    DuplicateEmail,

    /// Name uniqueness violation (roles)
    #[error("{0}")]
    DuplicateName(String),

    /// Referenced record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Record already in the requested state (e.g. existing membership)
    #[error("{0}")]
    Conflict(String),

    /// Business rule violation
    #[error("{0}")]
    Rule(String),

    /// Operation not allowed for the acting user
    #[error("{0}")]
    Forbidden(String),
}

impl StoreError {
    /// `"{entity} not found"`
    pub fn missing(entity: &str) -> Self {
        StoreError::NotFound(format!("{} not found", entity))
    }

    pub fn rule(message: impl Into<String>) -> Self {
        StoreError::Rule(message.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unauthorized - authentication required (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden - insufficient permissions (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Conflict - resource already exists or state conflict (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unprocessable entity - validation failed (422), with per-field codes
    #[error("Validation error: {0}")]
    ValidationError(String, Option<serde_json::Value>),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }

    /// The message without its category prefix
    pub fn message(&self) -> &str {
        match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg)
            | AppError::ValidationError(msg, _)
            | AppError::Internal(msg) => msg,
        }
    }
}

/// Error response body
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error response
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, should_log) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", false),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", false),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized", false),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", true),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict", false),
            AppError::ValidationError(..) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", false)
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", true),
        };

        if should_log {
            error!(error = %self, error_type = error_type, "Request error");
        }

        let mut body = ErrorResponse::new(error_type, self.message());
        if let AppError::ValidationError(_, Some(details)) = &self {
            body = body.with_details(details.clone());
        }

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AppError::Conflict(err.to_string()),
            StoreError::DuplicateName(msg) | StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Rule(msg) => AppError::BadRequest(msg),
            StoreError::Forbidden(msg) => AppError::Forbidden(msg),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let fields: serde_json::Map<String, serde_json::Value> = err
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let codes = errors
                    .iter()
                    .map(|e| serde_json::Value::String(e.code.to_string()))
                    .collect();
                (field.to_string(), serde_json::Value::Array(codes))
            })
            .collect();
        AppError::ValidationError(err.to_string(), Some(serde_json::Value::Object(fields)))
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
