//! Member directory operations

use chrono::Utc;
use serde_json::json;

use super::{new_id, DataStore};
use crate::models::{
    CreateUserRequest, Household, HouseholdRole, NewAuditEntry, UpdateUserRequest, User,
    UserAttendanceSummary, UserContributionSummary, UserGroupSummary, UserProfile,
    UserProfileView, UserRoleAssignment, UserView,
};
use crate::services::ChangeSet;
use crate::utils::validation::same_email;
use crate::utils::{StoreError, StoreResult};

impl DataStore {
    fn user_index(&self, id: &str) -> StoreResult<usize> {
        self.users
            .iter()
            .position(|u| u.id == id && !u.is_archived())
            .ok_or_else(|| StoreError::missing("User"))
    }

    /// Index lookup that also finds archived users
    fn any_user_index(&self, id: &str) -> StoreResult<usize> {
        self.users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| StoreError::missing("User"))
    }

    fn email_taken(&self, email: &str, except_user_id: Option<&str>) -> bool {
        self.users
            .iter()
            .any(|u| Some(u.id.as_str()) != except_user_id && same_email(&u.primary_email, email))
    }

    /// Resolve requested roles into assignments, defaulting to the member role
    fn role_assignments(&self, requested: &[String]) -> Vec<UserRoleAssignment> {
        let mut role_ids: Vec<String> = Vec::new();
        if requested.is_empty() {
            role_ids.push(self.resolve_role_id(None));
        }
        for identifier in requested {
            let role_id = self.resolve_role_id(Some(identifier));
            if !role_ids.contains(&role_id) {
                role_ids.push(role_id);
            }
        }
        role_ids
            .into_iter()
            .map(|role_id| UserRoleAssignment {
                church_id: self.church.id.clone(),
                role_id,
            })
            .collect()
    }

    /// Directory listing, optionally filtered by a case-insensitive name/email search
    pub fn list_users(&self, query: Option<&str>) -> Vec<UserView> {
        let needle = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        self.users
            .iter()
            .filter(|user| !user.is_archived())
            .filter(|user| match &needle {
                Some(needle) => {
                    let full_name = format!(
                        "{} {}",
                        user.profile.first_name, user.profile.last_name
                    )
                    .to_lowercase();
                    full_name.contains(needle.as_str())
                        || user.primary_email.to_lowercase().contains(needle.as_str())
                }
                None => true,
            })
            .map(|user| self.user_view(user))
            .collect()
    }

    pub fn get_user(&self, id: &str) -> StoreResult<UserView> {
        self.live_user(id)
            .map(|user| self.user_view(user))
            .ok_or_else(|| StoreError::missing("User"))
    }

    /// The user plus their group memberships, attendance and giving
    pub fn get_user_profile(&self, id: &str) -> StoreResult<UserProfileView> {
        let user = self.live_user(id).ok_or_else(|| StoreError::missing("User"))?;

        let groups = self
            .groups
            .iter()
            .filter_map(|group| {
                group.member(id).map(|member| UserGroupSummary {
                    id: group.id.clone(),
                    name: group.name.clone(),
                    role: member.role,
                    group_type: group.group_type,
                })
            })
            .collect();

        let attendance = self
            .events
            .iter()
            .flat_map(|event| {
                event
                    .attendance
                    .iter()
                    .filter(|record| record.user_id == id)
                    .map(|record| UserAttendanceSummary {
                        event_id: event.id.clone(),
                        title: event.title.clone(),
                        start_at: event.start_at,
                        status: record.status,
                    })
            })
            .collect();

        let mut contributions: Vec<UserContributionSummary> = self
            .contributions
            .iter()
            .filter(|c| c.member_id == id && c.deleted_at.is_none())
            .map(|c| UserContributionSummary {
                contribution_id: c.id.clone(),
                amount: c.amount,
                date: c.date,
                fund_id: c.fund_id.clone(),
                method: c.method,
            })
            .collect();
        contributions.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(UserProfileView {
            user: self.user_view(user),
            groups,
            attendance,
            contributions,
        })
    }

    /// Add a member to the directory with a fresh household
    pub fn create_user(&mut self, actor_id: &str, input: CreateUserRequest) -> StoreResult<UserView> {
        let email = input.primary_email.trim().to_string();
        if self.email_taken(&email, None) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let household = Household {
            id: new_id("household"),
            church_id: self.church.id.clone(),
            name: format!("{} Family", input.last_name.trim()),
            address: input.address,
            created_at: now,
            updated_at: now,
            archived_at: None,
        };

        let user = User {
            id: new_id("user"),
            primary_email: email,
            status: input.status.unwrap_or_default(),
            created_at: now,
            last_login_at: None,
            roles: self.role_assignments(&input.role_ids),
            profile: UserProfile {
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                phone: input.phone,
                notes: input.notes,
                household_id: household.id.clone(),
                household_role: HouseholdRole::Head,
                membership_status: None,
                join_date: Some(now.date_naive()),
                photo_url: None,
            },
            archived_at: None,
        };

        let role_ids: Vec<&str> = user.roles.iter().map(|r| r.role_id.as_str()).collect();
        let summary = format!(
            "{} added {} to the directory",
            self.display_name(actor_id),
            user.display_name()
        );
        let entry = NewAuditEntry::new(actor_id, "user.created", "user", summary)
            .entity_id(&user.id)
            .metadata(json!({
                "userId": user.id,
                "email": user.primary_email,
                "roles": role_ids,
            }));

        self.households.push(household);
        self.users.push(user.clone());
        self.record(entry);

        Ok(self.user_view(&user))
    }

    /// Apply a partial profile update; an audit entry is written only when something changed
    pub fn update_user(
        &mut self,
        actor_id: &str,
        id: &str,
        input: UpdateUserRequest,
    ) -> StoreResult<UserView> {
        let index = self.user_index(id)?;

        let email = input.primary_email.map(|e| e.trim().to_string());
        if let Some(email) = &email {
            if self.email_taken(email, Some(id)) {
                return Err(StoreError::DuplicateEmail);
            }
        }
        let roles = input.role_ids.map(|ids| self.role_assignments(&ids));

        let mut changes = ChangeSet::new();
        let user = &mut self.users[index];
        changes.track("primaryEmail", &mut user.primary_email, email);
        changes.track("status", &mut user.status, input.status);
        changes.track("firstName", &mut user.profile.first_name, input.first_name);
        changes.track("lastName", &mut user.profile.last_name, input.last_name);
        changes.track("phone", &mut user.profile.phone, input.phone);
        changes.track("notes", &mut user.profile.notes, input.notes);
        changes.track(
            "membershipStatus",
            &mut user.profile.membership_status,
            input.membership_status,
        );
        changes.track("joinDate", &mut user.profile.join_date, input.join_date);
        changes.track(
            "householdRole",
            &mut user.profile.household_role,
            input.household_role,
        );

        if let Some(roles) = roles {
            let previous: Vec<&str> = user.roles.iter().map(|r| r.role_id.as_str()).collect();
            let next: Vec<&str> = roles.iter().map(|r| r.role_id.as_str()).collect();
            changes.record("roles", &previous, &next);
            if changes.contains("roles") {
                user.roles = roles;
            }
        }

        let household_id = user.profile.household_id.clone();
        if let Some(household) = self.households.iter_mut().find(|h| h.id == household_id) {
            if changes.track("address", &mut household.address, input.address) {
                household.updated_at = Utc::now();
            }
        }

        if let Some(diff) = changes.into_diff() {
            let summary = format!(
                "{} updated {}'s profile",
                self.display_name(actor_id),
                self.display_name(id)
            );
            let fields: Vec<&String> = diff.keys().collect();
            let metadata = json!({ "userId": id, "fields": fields });
            self.record(
                NewAuditEntry::new(actor_id, "user.updated", "user", summary)
                    .entity_id(id)
                    .metadata(metadata)
                    .diff(Some(diff)),
            );
        }

        self.get_user(id)
    }

    /// Remove a user and every reference to them
    pub fn delete_user(&mut self, actor_id: &str, id: &str) -> StoreResult<()> {
        if actor_id == id {
            return Err(StoreError::Forbidden(
                "You cannot delete your own account".into(),
            ));
        }
        let index = self.any_user_index(id)?;

        let summary = format!(
            "{} removed {} from the directory",
            self.display_name(actor_id),
            self.display_name(id)
        );
        let user = self.users.remove(index);

        for group in &mut self.groups {
            group.members.retain(|m| m.user_id != id);
        }
        for event in &mut self.events {
            event.attendance.retain(|a| a.user_id != id);
        }
        self.announcement_reads.retain(|r| r.user_id != id);
        self.contributions.retain(|c| c.member_id != id);
        self.sessions.retain(|s| s.user_id != id);
        for checkin in &mut self.checkins {
            if checkin.checked_in_by.as_deref() == Some(id) {
                checkin.checked_in_by = None;
            }
            if checkin.checked_out_by.as_deref() == Some(id) {
                checkin.checked_out_by = None;
            }
        }

        self.record(
            NewAuditEntry::new(actor_id, "user.deleted", "user", summary)
                .entity_id(id)
                .metadata(json!({ "userId": id, "email": user.primary_email })),
        );
        Ok(())
    }

    /// Archived users, most recently archived first
    pub fn list_archived_users(&self) -> Vec<UserView> {
        let mut archived: Vec<&User> = self.users.iter().filter(|u| u.is_archived()).collect();
        archived.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));
        archived.into_iter().map(|u| self.user_view(u)).collect()
    }

    /// Hide a user from the directory and end their sessions; nothing else is touched
    pub fn archive_user(&mut self, actor_id: &str, id: &str) -> StoreResult<UserView> {
        if actor_id == id {
            return Err(StoreError::Forbidden(
                "You cannot archive your own account".into(),
            ));
        }
        let index = self.any_user_index(id)?;
        if self.users[index].is_archived() {
            return Err(StoreError::rule("User is already archived"));
        }
        self.users[index].archived_at = Some(Utc::now());
        self.sessions.retain(|s| s.user_id != id);

        self.user_lifecycle(actor_id, id, "user.archived", "archived");
        Ok(self.user_view(&self.users[index]))
    }

    pub fn restore_user(&mut self, actor_id: &str, id: &str) -> StoreResult<UserView> {
        let index = self.any_user_index(id)?;
        if !self.users[index].is_archived() {
            return Err(StoreError::rule("User is not archived"));
        }
        self.users[index].archived_at = None;

        self.user_lifecycle(actor_id, id, "user.restored", "restored");
        Ok(self.user_view(&self.users[index]))
    }

    fn user_lifecycle(&mut self, actor_id: &str, id: &str, action: &str, verb: &str) {
        let summary = format!(
            "{} {} {}",
            self.display_name(actor_id),
            verb,
            self.display_name(id)
        );
        self.record(
            NewAuditEntry::new(actor_id, action, "user", summary)
                .entity_id(id)
                .metadata(json!({ "userId": id })),
        );
    }
}
