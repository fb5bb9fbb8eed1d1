//! In-memory data store
//!
//! This module owns every collection the API serves:
//! - Member directory, households and roles
//! - Groups, events, announcements and giving
//! - Children's check-in, sessions and onboarding settings
//! - The audit trail (see [`crate::services::audit`])
//!
//! Operations are split by resource across the submodules, each adding an
//! `impl DataStore` block. Mutations diff their input through
//! [`ChangeSet`](crate::services::ChangeSet) and append to the audit trail.

mod announcements;
mod audit_logs;
pub mod audit_snapshot;
mod checkin;
mod events;
mod giving;
mod groups;
mod households;
mod invitations;
mod requests;
mod roles;
pub mod seed;
mod sessions;
mod settings;
mod users;

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::{
    system_roles, Announcement, AnnouncementRead, AuditLogRecord, Checkin, Child, Church,
    Contribution, Event, Fund, Group, Household, Invitation, MemberRequest, NewAuditEntry,
    RequestType, Role, Session, Settings, User, UserRoleView, UserView,
};
use crate::services::AuditLog;

pub use audit_snapshot::AuditSnapshot;
pub use seed::SeedData;

/// Store shared between request handlers
pub type SharedStore = Arc<RwLock<DataStore>>;

#[derive(Debug)]
pub struct DataStore {
    church: Church,
    users: Vec<User>,
    households: Vec<Household>,
    groups: Vec<Group>,
    events: Vec<Event>,
    announcements: Vec<Announcement>,
    announcement_reads: Vec<AnnouncementRead>,
    funds: Vec<Fund>,
    contributions: Vec<Contribution>,
    roles: Vec<Role>,
    children: Vec<Child>,
    checkins: Vec<Checkin>,
    sessions: Vec<Session>,
    settings: Option<Settings>,
    request_types: Vec<RequestType>,
    requests: Vec<MemberRequest>,
    invitations: Vec<Invitation>,
    audit: AuditLog,
}

impl DataStore {
    pub fn new(church: Church, seed: SeedData, audit: AuditLog) -> Self {
        Self {
            church,
            users: seed.users,
            households: seed.households,
            groups: seed.groups,
            events: seed.events,
            announcements: seed.announcements,
            announcement_reads: seed.announcement_reads,
            funds: seed.funds,
            contributions: seed.contributions,
            roles: seed.roles,
            children: seed.children,
            checkins: seed.checkins,
            sessions: seed.sessions,
            settings: seed.settings,
            request_types: seed.request_types,
            requests: seed.requests,
            invitations: seed.invitations,
            audit,
        }
    }

    /// Demo data plus the audit trail restored from the configured snapshot
    pub fn seeded(config: &AppConfig) -> Self {
        let church = church_from_config(config);
        let seed = SeedData::demo(&church, Utc::now());
        let snapshot = AuditSnapshot::from_config(&config.audit);
        if snapshot.is_enabled() {
            info!(path = %snapshot.path().display(), "Audit log persistence enabled");
        } else {
            info!("Audit log persistence disabled");
        }
        let audit = AuditLog::open(snapshot, seed.audit_logs.clone());
        Self::new(church, seed, audit)
    }

    /// Demo data with an audit trail that never touches the disk
    pub fn in_memory(church: Church) -> Self {
        let seed = SeedData::demo(&church, Utc::now());
        let audit = AuditLog::in_memory(seed.audit_logs.clone());
        Self::new(church, seed, audit)
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    pub fn church(&self) -> &Church {
        &self.church
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    pub fn find_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Like [`DataStore::find_user`], skipping archived users
    pub fn live_user(&self, id: &str) -> Option<&User> {
        self.find_user(id).filter(|u| !u.is_archived())
    }

    /// Name used in audit summaries: full name, then email, then the raw id
    pub fn display_name(&self, user_id: &str) -> String {
        self.find_user(user_id)
            .map(User::display_name)
            .unwrap_or_else(|| user_id.to_string())
    }

    /// Append to the audit trail under this church
    fn record(&mut self, entry: NewAuditEntry) -> AuditLogRecord {
        self.audit.append(entry, &self.church.id)
    }

    /// Look a role up by id, slug or name (case-insensitive)
    fn find_role(&self, identifier: &str) -> Option<&Role> {
        let identifier = identifier.trim();
        self.roles
            .iter()
            .find(|r| r.id == identifier)
            .or_else(|| self.roles.iter().find(|r| r.slug == identifier))
            .or_else(|| {
                self.roles
                    .iter()
                    .find(|r| r.name.eq_ignore_ascii_case(identifier))
            })
    }

    fn role_id_by_slug(&self, slug: &str) -> String {
        self.roles
            .iter()
            .find(|r| r.slug == slug)
            .map(|r| r.id.clone())
            .unwrap_or_else(|| format!("role-{}", slug))
    }

    /// Resolve a role identifier, falling back to the member role
    fn resolve_role_id(&self, identifier: Option<&str>) -> String {
        identifier
            .and_then(|i| self.find_role(i))
            .map(|r| r.id.clone())
            .unwrap_or_else(|| self.role_id_by_slug(system_roles::MEMBER))
    }

    fn household(&self, id: &str) -> Option<&Household> {
        self.households.iter().find(|h| h.id == id)
    }

    fn live_household(&self, id: &str) -> Option<&Household> {
        self.household(id).filter(|h| h.archived_at.is_none())
    }

    /// Whether the user's profile points at the household
    pub fn belongs_to_household(&self, user_id: &str, household_id: &str) -> bool {
        self.live_user(user_id)
            .map_or(false, |u| u.profile.household_id == household_id)
    }

    /// User expanded with role definitions and household
    pub fn user_view(&self, user: &User) -> UserView {
        let roles = user
            .roles
            .iter()
            .map(|assignment| {
                let role = self.roles.iter().find(|r| r.id == assignment.role_id);
                UserRoleView {
                    church_id: assignment.church_id.clone(),
                    role_id: assignment.role_id.clone(),
                    role: role
                        .map(|r| r.name.clone())
                        .unwrap_or_else(|| assignment.role_id.clone()),
                    slug: role.map(|r| r.slug.clone()),
                    permissions: role.map(|r| r.permissions.clone()).unwrap_or_default(),
                    is_system: role.map(|r| r.is_system).unwrap_or(false),
                    is_deletable: role.map(|r| r.is_deletable).unwrap_or(false),
                }
            })
            .collect();

        UserView {
            id: user.id.clone(),
            primary_email: user.primary_email.clone(),
            status: user.status,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
            profile: user.profile.clone(),
            roles,
            household: self.household(&user.profile.household_id).cloned(),
            archived_at: user.archived_at,
        }
    }
}

fn church_from_config(config: &AppConfig) -> Church {
    Church {
        id: config.church.id.clone(),
        name: config.church.name.clone(),
        timezone: config.church.timezone.clone(),
    }
}

/// `{prefix}-{uuid}`
fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}
