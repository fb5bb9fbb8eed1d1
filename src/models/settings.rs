//! Church profile, onboarding settings and dashboard models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::patch::double_option;
use crate::utils::validation::HEX_COLOR_REGEX;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Church {
    pub id: String,
    pub name: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub church_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_color: Option<String>,
    pub onboarding_complete: bool,
    #[serde(default)]
    pub enabled_fields: Vec<String>,
    #[serde(default)]
    pub request_types: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Settings {
    pub fn new(church_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            church_id: church_id.into(),
            logo_url: None,
            brand_color: None,
            onboarding_complete: false,
            enabled_fields: Vec::new(),
            request_types: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub logo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub brand_color: Option<Option<String>>,
    pub onboarding_complete: Option<bool>,
    pub enabled_fields: Option<Vec<String>>,
    pub request_types: Option<Vec<String>>,
}

impl UpdateSettingsRequest {
    /// Brand colors must be `#rgb` or `#rrggbb`
    pub fn brand_color_is_valid(&self) -> bool {
        match &self.brand_color {
            Some(Some(color)) => HEX_COLOR_REGEX.is_match(color),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub member_count: usize,
    pub group_count: usize,
    pub upcoming_events: usize,
    pub unread_announcements: usize,
    pub total_giving_last30: f64,
}
