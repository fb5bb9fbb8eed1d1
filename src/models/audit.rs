//! Audit log models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserSummary;

/// Before/after pair for a single changed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub previous: serde_json::Value,
    #[serde(rename = "newValue")]
    pub new_value: serde_json::Value,
}

/// Changed field name -> before/after values. Only changed fields appear.
pub type DiffMap = BTreeMap<String, FieldChange>;

/// One immutable entry of the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogRecord {
    pub id: String,
    pub church_id: String,
    pub actor_user_id: String,
    pub action: String,
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<DiffMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Input for appending to the audit trail
#[derive(Debug, Clone, Default)]
pub struct NewAuditEntry {
    pub church_id: Option<String>,
    pub actor_user_id: String,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub summary: String,
    pub diff: Option<DiffMap>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewAuditEntry {
    pub fn new(
        actor_user_id: impl Into<String>,
        action: impl Into<String>,
        entity: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            actor_user_id: actor_user_id.into(),
            action: action.into(),
            entity: entity.into(),
            summary: summary.into(),
            ..Default::default()
        }
    }

    pub fn entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn diff(mut self, diff: Option<DiffMap>) -> Self {
        self.diff = diff;
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }
}

/// Query parameters for listing the audit trail
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogFilter {
    pub church_id: Option<String>,
    pub actor_user_id: Option<String>,
    pub entity: Option<String>,
    pub entity_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// An audit record decorated with its actor, resolved at query time
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogItem {
    #[serde(flatten)]
    pub record: AuditLogRecord,
    pub actor: Option<UserSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditLogPage {
    pub items: Vec<AuditLogItem>,
    pub meta: PageMeta,
}
