//! Audit trail access

use super::DataStore;
use crate::models::{AuditLogFilter, AuditLogItem, AuditLogPage, AuditLogRecord, NewAuditEntry};

impl DataStore {
    /// Append an arbitrary entry; the church defaults to this store's church
    pub fn create_audit_log(&mut self, entry: NewAuditEntry) -> AuditLogRecord {
        self.record(entry)
    }

    /// One page of the trail, newest first, each item carrying its actor
    pub fn list_audit_logs(&self, filter: &AuditLogFilter) -> AuditLogPage {
        let (records, meta) = self.audit.query(filter, &self.church.id);
        let items = records
            .into_iter()
            .map(|record| {
                let actor = self.find_user(&record.actor_user_id).map(|u| u.summary());
                AuditLogItem { record, actor }
            })
            .collect();
        AuditLogPage { items, meta }
    }
}
