//! Member directory models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{AttendanceStatus, ContributionMethod, GroupMemberRole, GroupType, Household};
use crate::utils::patch::double_option;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Invited,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HouseholdRole {
    #[default]
    Head,
    Spouse,
    Child,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipStatus {
    Inquirer,
    Attender,
    Member,
    Paused,
    Inactive,
}

/// A role granted to a user within a church
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoleAssignment {
    pub church_id: String,
    pub role_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub household_id: String,
    pub household_role: HouseholdRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_status: Option<MembershipStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub primary_email: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    pub roles: Vec<UserRoleAssignment>,
    pub profile: UserProfile,
    /// Set while the record is archived; archived records drop out of listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl User {
    /// Full name, falling back to the email when the name is blank
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.profile.first_name, self.profile.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.primary_email.clone()
        } else {
            full.to_string()
        }
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    pub fn has_role(&self, role_id: &str) -> bool {
        self.roles.iter().any(|r| r.role_id == role_id)
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            primary_email: self.primary_email.clone(),
            first_name: self.profile.first_name.clone(),
            last_name: self.profile.last_name.clone(),
            status: self.status,
        }
    }
}

/// Compact user reference embedded in other payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub primary_email: String,
    pub first_name: String,
    pub last_name: String,
    pub status: UserStatus,
}

/// Role assignment expanded with its definition
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoleView {
    pub church_id: String,
    pub role_id: String,
    pub role: String,
    pub slug: Option<String>,
    pub permissions: Vec<String>,
    pub is_system: bool,
    pub is_deletable: bool,
}

/// User as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub primary_email: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub profile: UserProfile,
    pub roles: Vec<UserRoleView>,
    pub household: Option<Household>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl UserView {
    pub fn has_role_slug(&self, slug: &str) -> bool {
        self.roles.iter().any(|r| r.slug.as_deref() == Some(slug))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupSummary {
    pub id: String,
    pub name: String,
    pub role: GroupMemberRole,
    #[serde(rename = "type")]
    pub group_type: GroupType,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAttendanceSummary {
    pub event_id: String,
    pub title: String,
    pub start_at: DateTime<Utc>,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContributionSummary {
    pub contribution_id: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub fund_id: Option<String>,
    pub method: ContributionMethod,
}

/// Full profile with the user's footprint across the church
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileView {
    #[serde(flatten)]
    pub user: UserView,
    pub groups: Vec<UserGroupSummary>,
    pub attendance: Vec<UserAttendanceSummary>,
    pub contributions: Vec<UserContributionSummary>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email)]
    pub primary_email: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub address: Option<String>,
    pub status: Option<UserStatus>,
    /// Role ids, slugs or names; defaults to the member role
    #[serde(default)]
    pub role_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub primary_email: Option<String>,
    pub status: Option<UserStatus>,
    pub role_ids: Option<Vec<String>>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub membership_status: Option<Option<MembershipStatus>>,
    #[serde(default, deserialize_with = "double_option")]
    pub join_date: Option<Option<NaiveDate>>,
    pub household_role: Option<HouseholdRole>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub q: Option<String>,
}
