//! Business logic services
//!
//! - `diff` applies partial updates field by field and builds the audit diff
//! - `audit` keeps the append-only audit trail and its pagination

pub mod audit;
pub mod diff;

pub use audit::AuditLog;
pub use diff::ChangeSet;
