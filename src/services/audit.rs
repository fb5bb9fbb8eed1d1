//! Append-only audit trail
//!
//! Holds every audit record in creation order and mirrors the whole trail to
//! the snapshot file after each append.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

use crate::db::audit_snapshot::AuditSnapshot;
use crate::models::{AuditLogFilter, AuditLogRecord, NewAuditEntry, PageMeta};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug)]
pub struct AuditLog {
    records: Vec<AuditLogRecord>,
    /// Ids of every record, for collision checks on append
    ids: HashSet<String>,
    snapshot: AuditSnapshot,
}

impl AuditLog {
    /// Restore the trail from `snapshot`, or start from `fallback` and write it out
    pub fn open(snapshot: AuditSnapshot, fallback: Vec<AuditLogRecord>) -> Self {
        match snapshot.load() {
            Some(records) => {
                info!(
                    path = %snapshot.path().display(),
                    count = records.len(),
                    "Loaded audit log snapshot"
                );
                Self::from_records(records, snapshot)
            }
            None => {
                let log = Self::from_records(fallback, snapshot);
                log.persist();
                log
            }
        }
    }

    /// A trail that lives only in memory
    pub fn in_memory(records: Vec<AuditLogRecord>) -> Self {
        Self::from_records(records, AuditSnapshot::disabled())
    }

    fn from_records(records: Vec<AuditLogRecord>, snapshot: AuditSnapshot) -> Self {
        let ids = records.iter().map(|r| r.id.clone()).collect();
        Self {
            records,
            ids,
            snapshot,
        }
    }

    /// Append an entry and rewrite the snapshot
    pub fn append(&mut self, entry: NewAuditEntry, default_church_id: &str) -> AuditLogRecord {
        let now = Utc::now();
        let id = self.unique_id(generate_id(&entry.entity, entry.entity_id.as_deref(), now));

        let record = AuditLogRecord {
            id,
            church_id: entry
                .church_id
                .unwrap_or_else(|| default_church_id.to_string()),
            actor_user_id: entry.actor_user_id,
            action: entry.action,
            entity: entry.entity,
            entity_id: entry.entity_id,
            summary: entry.summary,
            diff: entry.diff,
            metadata: entry.metadata,
            created_at: entry.created_at.unwrap_or(now),
        };

        self.ids.insert(record.id.clone());
        self.records.push(record.clone());
        self.persist();
        record
    }

    /// Filter, sort newest first and paginate
    pub fn query(
        &self,
        filter: &AuditLogFilter,
        default_church_id: &str,
    ) -> (Vec<AuditLogRecord>, PageMeta) {
        let church_id = filter.church_id.as_deref().unwrap_or(default_church_id);

        // reverse first so equal timestamps list the latest append first
        let mut matching: Vec<&AuditLogRecord> = self
            .records
            .iter()
            .rev()
            .filter(|r| r.church_id == church_id)
            .filter(|r| matches_opt(&filter.actor_user_id, &r.actor_user_id))
            .filter(|r| matches_opt(&filter.entity, &r.entity))
            .filter(|r| match &filter.entity_id {
                Some(id) => r.entity_id.as_deref() == Some(id.as_str()),
                None => true,
            })
            .filter(|r| filter.from.map_or(true, |from| r.created_at >= from))
            .filter(|r| filter.to.map_or(true, |to| r.created_at <= to))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let page = normalize_page(filter.page);
        let page_size = normalize_page_size(filter.page_size);
        let total = matching.len();

        let items = matching
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .cloned()
            .collect();

        (
            items,
            PageMeta {
                total,
                page,
                page_size,
            },
        )
    }

    pub fn records(&self) -> &[AuditLogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&AuditLogRecord> {
        self.records.last()
    }

    /// Snapshot file, when persistence is enabled
    pub fn snapshot_path(&self) -> Option<&std::path::Path> {
        self.snapshot.is_enabled().then(|| self.snapshot.path())
    }

    /// Rewrite the snapshot with the full in-memory trail
    pub fn persist(&self) {
        self.snapshot.save(&self.records);
    }

    fn unique_id(&self, base: String) -> String {
        let mut id = base.clone();
        let mut n = 1;
        while self.ids.contains(&id) {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        id
    }
}

fn matches_opt(wanted: &Option<String>, actual: &str) -> bool {
    wanted.as_deref().map_or(true, |w| w == actual)
}

fn normalize_page(page: Option<i64>) -> usize {
    match page {
        Some(p) if p > 0 => p as usize,
        _ => 1,
    }
}

fn normalize_page_size(size: Option<i64>) -> usize {
    match size {
        Some(s) if s > 0 => (s as usize).min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// `audit-{entity}-{entityId}-{millis}`, or `audit-{millis}-{hex4}` without an entity id
pub fn generate_id(entity: &str, entity_id: Option<&str>, at: DateTime<Utc>) -> String {
    let millis = at.timestamp_millis();
    match entity_id {
        Some(entity_id) => format!("audit-{}-{}-{}", entity, entity_id, millis),
        None => {
            let suffix: u16 = rand::thread_rng().gen();
            format!("audit-{}-{:04x}", millis, suffix)
        }
    }
}
