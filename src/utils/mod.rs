//! Shared utilities

pub mod error;
pub mod patch;
pub mod validation;

pub use error::{AppError, AppResult, ErrorResponse, StoreError, StoreResult};
