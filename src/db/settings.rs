//! Onboarding settings and the dashboard snapshot

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use super::DataStore;
use crate::models::{DashboardSnapshot, NewAuditEntry, Settings, UpdateSettingsRequest};
use crate::services::ChangeSet;
use crate::utils::{StoreError, StoreResult};

const GIVING_WINDOW_DAYS: i64 = 30;

impl DataStore {
    /// Church settings, created with defaults on first access
    pub fn get_settings(&mut self) -> Settings {
        let church_id = self.church.id.clone();
        self.settings
            .get_or_insert_with(|| Settings::new(church_id, Utc::now()))
            .clone()
    }

    pub fn update_settings(&mut self, actor_id: &str, input: UpdateSettingsRequest) -> StoreResult<Settings> {
        if !input.brand_color_is_valid() {
            return Err(StoreError::rule(
                "Brand color must be a hex value such as #1a2b3c",
            ));
        }
        let church_id = self.church.id.clone();
        let settings = self
            .settings
            .get_or_insert_with(|| Settings::new(church_id, Utc::now()));

        let mut changes = ChangeSet::new();
        changes.track("logoUrl", &mut settings.logo_url, input.logo_url);
        changes.track("brandColor", &mut settings.brand_color, input.brand_color);
        changes.track(
            "onboardingComplete",
            &mut settings.onboarding_complete,
            input.onboarding_complete,
        );
        changes.track("enabledFields", &mut settings.enabled_fields, input.enabled_fields);
        changes.track("requestTypes", &mut settings.request_types, input.request_types);
        if !changes.is_empty() {
            settings.updated_at = Utc::now();
        }
        let updated = settings.clone();

        if let Some(diff) = changes.into_diff() {
            let summary = format!("{} updated church settings", self.display_name(actor_id));
            self.record(
                NewAuditEntry::new(actor_id, "settings.updated", "settings", summary)
                    .entity_id(&updated.church_id)
                    .metadata(json!({ "churchId": updated.church_id }))
                    .diff(Some(diff)),
            );
        }
        Ok(updated)
    }

    pub fn dashboard_snapshot(&self) -> DashboardSnapshot {
        self.dashboard_snapshot_at(Utc::now())
    }

    /// Headline numbers for the admin dashboard as of `now`
    pub fn dashboard_snapshot_at(&self, now: DateTime<Utc>) -> DashboardSnapshot {
        let church_id = self.church.id.as_str();
        let member_count = self
            .users
            .iter()
            .filter(|u| !u.is_archived() && u.roles.iter().any(|r| r.church_id == church_id))
            .count();
        let group_count = self
            .groups
            .iter()
            .filter(|g| g.church_id == church_id && g.archived_at.is_none())
            .count();
        let upcoming_events = self
            .events
            .iter()
            .filter(|e| e.church_id == church_id && e.archived_at.is_none() && e.start_at >= now)
            .count();
        let unread_announcements = self
            .announcements
            .iter()
            .filter(|a| a.church_id == church_id && a.archived_at.is_none())
            .filter(|a| {
                let reads = self
                    .announcement_reads
                    .iter()
                    .filter(|r| r.announcement_id == a.id)
                    .count();
                reads < member_count
            })
            .count();

        let window_start = (now - Duration::days(GIVING_WINDOW_DAYS)).date_naive();
        let total: f64 = self
            .contributions
            .iter()
            .filter(|c| c.church_id == church_id && c.deleted_at.is_none())
            .filter(|c| c.date >= window_start)
            .map(|c| c.amount)
            .sum();

        DashboardSnapshot {
            member_count,
            group_count,
            upcoming_events,
            unread_announcements,
            total_giving_last30: (total * 100.0).round() / 100.0,
        }
    }
}
