//! Role management
//!
//! System roles keep their slug forever and the admin role can never be
//! removed. Deleting a role that is still assigned moves its holders onto a
//! replacement role.

use chrono::Utc;
use serde_json::json;

use super::{new_id, DataStore};
use crate::models::{
    system_roles, CreateRoleRequest, NewAuditEntry, Role, RoleDeletion, RoleView,
    UpdateRoleRequest, UserRoleAssignment,
};
use crate::services::ChangeSet;
use crate::utils::validation::{normalize_permissions, slugify};
use crate::utils::{StoreError, StoreResult};

const NAME_REQUIRED: &str = "Role name is required.";

impl DataStore {
    fn role_view(&self, role: &Role) -> RoleView {
        RoleView {
            role: role.clone(),
            assignment_count: self.users.iter().filter(|u| u.has_role(&role.id)).count(),
        }
    }

    fn role_name_taken(&self, name: &str, except_id: Option<&str>) -> bool {
        self.roles.iter().any(|r| {
            Some(r.id.as_str()) != except_id
                && r.church_id == self.church.id
                && r.name.eq_ignore_ascii_case(name)
        })
    }

    pub fn list_roles(&self) -> Vec<RoleView> {
        self.roles
            .iter()
            .filter(|r| r.church_id == self.church.id)
            .map(|r| self.role_view(r))
            .collect()
    }

    pub fn get_role(&self, id: &str) -> StoreResult<RoleView> {
        self.roles
            .iter()
            .find(|r| r.id == id)
            .map(|r| self.role_view(r))
            .ok_or_else(|| StoreError::missing("Role"))
    }

    pub fn create_role(&mut self, actor_id: &str, input: CreateRoleRequest) -> StoreResult<RoleView> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::rule(NAME_REQUIRED));
        }
        if self.role_name_taken(&name, None) {
            return Err(StoreError::DuplicateName(
                "A role with that name already exists.".into(),
            ));
        }

        let slug = input
            .slug
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&name));
        let now = Utc::now();
        let role = Role {
            id: new_id("role"),
            church_id: self.church.id.clone(),
            name,
            slug,
            description: input.description,
            permissions: normalize_permissions(input.permissions),
            is_system: false,
            is_deletable: true,
            created_at: now,
            updated_at: now,
        };

        let summary = format!("{} created role {}", self.display_name(actor_id), role.name);
        self.roles.push(role.clone());
        self.record(
            NewAuditEntry::new(actor_id, "role.created", "role", summary)
                .entity_id(&role.id)
                .metadata(json!({
                    "roleId": role.id,
                    "slug": role.slug,
                    "permissions": role.permissions,
                })),
        );
        Ok(self.role_view(&role))
    }

    pub fn update_role(
        &mut self,
        actor_id: &str,
        id: &str,
        input: UpdateRoleRequest,
    ) -> StoreResult<RoleView> {
        let index = self
            .roles
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::missing("Role"))?;

        let name = match input.name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(StoreError::rule(NAME_REQUIRED));
                }
                if self.role_name_taken(&name, Some(id)) {
                    return Err(StoreError::DuplicateName(
                        "Another role with that name already exists.".into(),
                    ));
                }
                Some(name)
            }
            None => None,
        };

        let role = &mut self.roles[index];
        let slug = match (&name, role.is_system) {
            (Some(name), false) => Some(slugify(name)),
            _ => None,
        };

        let mut changes = ChangeSet::new();
        changes.track("name", &mut role.name, name);
        changes.track("slug", &mut role.slug, slug);
        changes.track("description", &mut role.description, input.description);
        changes.track(
            "permissions",
            &mut role.permissions,
            input.permissions.map(normalize_permissions),
        );
        if !changes.is_empty() {
            role.updated_at = Utc::now();
        }
        let updated = role.clone();

        if let Some(diff) = changes.into_diff() {
            let summary = format!("{} updated role {}", self.display_name(actor_id), updated.name);
            self.record(
                NewAuditEntry::new(actor_id, "role.updated", "role", summary)
                    .entity_id(id)
                    .metadata(json!({ "roleId": id }))
                    .diff(Some(diff)),
            );
        }
        Ok(self.role_view(&updated))
    }

    /// Delete a role, moving any holders onto `reassign_role_id`
    ///
    /// An unknown role reports `deleted: false` rather than failing.
    pub fn delete_role(
        &mut self,
        actor_id: &str,
        id: &str,
        reassign_role_id: Option<&str>,
    ) -> StoreResult<RoleDeletion> {
        let Some(index) = self.roles.iter().position(|r| r.id == id) else {
            return Ok(RoleDeletion {
                deleted: false,
                reassigned: 0,
            });
        };
        let role = &self.roles[index];
        if !role.is_deletable || role.slug == system_roles::ADMIN {
            return Err(StoreError::rule("This role cannot be deleted."));
        }

        let holders = self.users.iter().filter(|u| u.has_role(id)).count();
        let mut replacement = None;
        if holders > 0 {
            let requested = reassign_role_id.ok_or_else(|| {
                StoreError::rule(
                    "Role is assigned to users. Provide reassignRoleId to transfer assignments.",
                )
            })?;
            let resolved = self.resolve_role_id(Some(requested));
            if resolved == id {
                return Err(StoreError::rule(
                    "Reassignment role must be different from the role being deleted.",
                ));
            }
            replacement = Some(resolved);
        }

        let mut reassigned = 0;
        if let Some(replacement) = &replacement {
            let church_id = self.church.id.clone();
            for user in self.users.iter_mut().filter(|u| u.has_role(id)) {
                user.roles.retain(|r| r.role_id != id);
                if !user.has_role(replacement) {
                    user.roles.push(UserRoleAssignment {
                        church_id: church_id.clone(),
                        role_id: replacement.clone(),
                    });
                }
                reassigned += 1;
            }
        }
        let role = self.roles.remove(index);

        let summary = format!("{} deleted role {}", self.display_name(actor_id), role.name);
        self.record(
            NewAuditEntry::new(actor_id, "role.deleted", "role", summary)
                .entity_id(id)
                .metadata(json!({
                    "roleId": id,
                    "name": role.name,
                    "reassignRoleId": replacement,
                    "reassigned": reassigned,
                })),
        );
        Ok(RoleDeletion {
            deleted: true,
            reassigned,
        })
    }
}
