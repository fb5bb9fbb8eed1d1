//! Role-Based Access Control (RBAC) models
//!
//! Roles are church-scoped bundles of permission strings. Three system roles
//! are seeded (`admin`, `leader`, `member`); admins may add custom roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::patch::double_option;

/// Slugs of the seeded system roles
pub mod system_roles {
    pub const ADMIN: &str = "admin";
    pub const LEADER: &str = "leader";
    pub const MEMBER: &str = "member";
}

/// Permission strings understood by the API
pub mod permissions {
    pub const USERS_MANAGE: &str = "users.manage";
    pub const GROUPS_MANAGE: &str = "groups.manage";
    pub const EVENTS_MANAGE: &str = "events.manage";
    pub const ANNOUNCEMENTS_MANAGE: &str = "announcements.manage";
    pub const GIVING_MANAGE: &str = "giving.manage";
    pub const CHECKIN_MANAGE: &str = "checkin.manage";
    pub const ROLES_MANAGE: &str = "roles.manage";
    pub const SETTINGS_MANAGE: &str = "settings.manage";
    pub const AUDIT_VIEW: &str = "audit.view";

    pub const ALL: &[&str] = &[
        USERS_MANAGE,
        GROUPS_MANAGE,
        EVENTS_MANAGE,
        ANNOUNCEMENTS_MANAGE,
        GIVING_MANAGE,
        CHECKIN_MANAGE,
        ROLES_MANAGE,
        SETTINGS_MANAGE,
        AUDIT_VIEW,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub church_id: String,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub is_system: bool,
    pub is_deletable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role with the number of users currently holding it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleView {
    #[serde(flatten)]
    pub role: Role,
    pub assignment_count: usize,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    #[validate(length(max = 100))]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRoleRequest {
    pub reassign_role_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleDeletion {
    pub deleted: bool,
    pub reassigned: usize,
}
