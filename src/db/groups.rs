//! Group and group membership operations

use chrono::Utc;
use serde_json::json;

use super::{new_id, DataStore};
use crate::models::{
    AddGroupMemberRequest, CreateGroupRequest, Group, GroupMember, GroupMemberView,
    NewAuditEntry, UpdateGroupMemberRequest, UpdateGroupRequest,
};
use crate::services::ChangeSet;
use crate::utils::{StoreError, StoreResult};

impl DataStore {
    fn group_index(&self, id: &str) -> StoreResult<usize> {
        self.groups
            .iter()
            .position(|g| g.id == id && g.archived_at.is_none())
            .ok_or_else(|| StoreError::missing("Group"))
    }

    fn any_group_index(&self, id: &str) -> StoreResult<usize> {
        self.groups
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| StoreError::missing("Group"))
    }

    pub fn list_groups(&self) -> Vec<Group> {
        self.groups
            .iter()
            .filter(|g| g.church_id == self.church.id && g.archived_at.is_none())
            .cloned()
            .collect()
    }

    pub fn get_group(&self, id: &str) -> StoreResult<Group> {
        let index = self.group_index(id)?;
        Ok(self.groups[index].clone())
    }

    pub fn create_group(&mut self, actor_id: &str, input: CreateGroupRequest) -> StoreResult<Group> {
        let group = Group {
            id: new_id("group"),
            church_id: self.church.id.clone(),
            name: input.name.trim().to_string(),
            group_type: input.group_type,
            description: input.description,
            meeting_day: input.meeting_day,
            meeting_time: input.meeting_time,
            tags: input.tags,
            members: Vec::new(),
            archived_at: None,
        };

        let summary = format!("{} created group {}", self.display_name(actor_id), group.name);
        self.groups.push(group.clone());
        self.record(
            NewAuditEntry::new(actor_id, "group.created", "group", summary)
                .entity_id(&group.id)
                .metadata(json!({ "groupId": group.id, "name": group.name })),
        );
        Ok(group)
    }

    pub fn update_group(
        &mut self,
        actor_id: &str,
        id: &str,
        input: UpdateGroupRequest,
    ) -> StoreResult<Group> {
        let index = self.group_index(id)?;
        let group = &mut self.groups[index];

        let mut changes = ChangeSet::new();
        changes.track("name", &mut group.name, input.name.map(|n| n.trim().to_string()));
        changes.track("type", &mut group.group_type, input.group_type);
        changes.track("description", &mut group.description, input.description);
        changes.track("meetingDay", &mut group.meeting_day, input.meeting_day);
        changes.track("meetingTime", &mut group.meeting_time, input.meeting_time);
        changes.track("tags", &mut group.tags, input.tags);
        let updated = group.clone();

        if let Some(diff) = changes.into_diff() {
            let summary = format!("{} updated group {}", self.display_name(actor_id), updated.name);
            self.record(
                NewAuditEntry::new(actor_id, "group.updated", "group", summary)
                    .entity_id(id)
                    .metadata(json!({ "groupId": id }))
                    .diff(Some(diff)),
            );
        }
        Ok(updated)
    }

    /// Delete a group and detach it from events and announcements
    pub fn delete_group(&mut self, actor_id: &str, id: &str) -> StoreResult<()> {
        let index = self.any_group_index(id)?;
        let group = self.groups.remove(index);

        for event in &mut self.events {
            if event.group_id.as_deref() == Some(id) {
                event.group_id = None;
            }
        }
        for announcement in &mut self.announcements {
            if let Some(group_ids) = announcement.group_ids.as_mut() {
                group_ids.retain(|g| g != id);
            }
        }

        let summary = format!("{} deleted group {}", self.display_name(actor_id), group.name);
        self.record(
            NewAuditEntry::new(actor_id, "group.deleted", "group", summary)
                .entity_id(id)
                .metadata(json!({ "groupId": id, "name": group.name })),
        );
        Ok(())
    }

    pub fn list_group_members(&self, group_id: &str) -> StoreResult<Vec<GroupMemberView>> {
        let group = &self.groups[self.group_index(group_id)?];

        Ok(group
            .members
            .iter()
            .map(|member| GroupMemberView {
                member: member.clone(),
                user: self.find_user(&member.user_id).map(|u| u.summary()),
            })
            .collect())
    }

    pub fn add_group_member(
        &mut self,
        actor_id: &str,
        group_id: &str,
        input: AddGroupMemberRequest,
    ) -> StoreResult<GroupMember> {
        let index = self.group_index(group_id)?;
        if self.groups[index].member(&input.user_id).is_some() {
            return Err(StoreError::Conflict(
                "User is already a member of this group".into(),
            ));
        }
        if self.live_user(&input.user_id).is_none() {
            return Err(StoreError::missing("User"));
        }

        let member = GroupMember {
            user_id: input.user_id,
            role: input.role.unwrap_or_default(),
            status: input.status.unwrap_or_default(),
            joined_at: input.joined_at.unwrap_or_else(Utc::now),
        };
        self.groups[index].members.push(member.clone());

        let summary = format!(
            "{} added {} to {}",
            self.display_name(actor_id),
            self.display_name(&member.user_id),
            self.groups[index].name
        );
        self.record(
            NewAuditEntry::new(actor_id, "group.member.added", "group", summary)
                .entity_id(group_id)
                .metadata(json!({
                    "groupId": group_id,
                    "userId": member.user_id,
                    "role": member.role,
                    "status": member.status,
                })),
        );
        Ok(member)
    }

    pub fn update_group_member(
        &mut self,
        actor_id: &str,
        group_id: &str,
        user_id: &str,
        input: UpdateGroupMemberRequest,
    ) -> StoreResult<GroupMember> {
        let index = self.group_index(group_id)?;
        let group = &mut self.groups[index];
        let group_name = group.name.clone();
        let member = group
            .members
            .iter_mut()
            .find(|m| m.user_id == user_id)
            .ok_or_else(|| StoreError::NotFound("Member not found in group".into()))?;

        let mut changes = ChangeSet::new();
        changes.track("role", &mut member.role, input.role);
        changes.track("status", &mut member.status, input.status);
        let updated = member.clone();

        if let Some(diff) = changes.into_diff() {
            let summary = format!(
                "{} updated {}'s membership in {}",
                self.display_name(actor_id),
                self.display_name(user_id),
                group_name
            );
            self.record(
                NewAuditEntry::new(actor_id, "group.member.updated", "group", summary)
                    .entity_id(group_id)
                    .metadata(json!({ "groupId": group_id, "userId": user_id }))
                    .diff(Some(diff)),
            );
        }
        Ok(updated)
    }

    pub fn remove_group_member(
        &mut self,
        actor_id: &str,
        group_id: &str,
        user_id: &str,
    ) -> StoreResult<()> {
        let index = self.group_index(group_id)?;
        let group = &mut self.groups[index];
        let position = group
            .members
            .iter()
            .position(|m| m.user_id == user_id)
            .ok_or_else(|| StoreError::NotFound("Member not found in group".into()))?;
        let removed = group.members.remove(position);
        let group_name = group.name.clone();

        let summary = format!(
            "{} removed {} from {}",
            self.display_name(actor_id),
            self.display_name(user_id),
            group_name
        );
        self.record(
            NewAuditEntry::new(actor_id, "group.member.removed", "group", summary)
                .entity_id(group_id)
                .metadata(json!({
                    "groupId": group_id,
                    "userId": user_id,
                    "role": removed.role,
                })),
        );
        Ok(())
    }

    pub fn list_archived_groups(&self) -> Vec<Group> {
        let mut groups: Vec<Group> = self
            .groups
            .iter()
            .filter(|g| g.church_id == self.church.id && g.archived_at.is_some())
            .cloned()
            .collect();
        groups.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));
        groups
    }

    /// Hide a group; its roster and event links stay in place
    pub fn archive_group(&mut self, actor_id: &str, id: &str) -> StoreResult<Group> {
        let index = self.any_group_index(id)?;
        if self.groups[index].archived_at.is_some() {
            return Err(StoreError::rule("Group is already archived"));
        }
        self.groups[index].archived_at = Some(Utc::now());
        let group = self.groups[index].clone();
        self.group_lifecycle(actor_id, &group, "group.archived", "archived");
        Ok(group)
    }

    pub fn restore_group(&mut self, actor_id: &str, id: &str) -> StoreResult<Group> {
        let index = self.any_group_index(id)?;
        if self.groups[index].archived_at.is_none() {
            return Err(StoreError::rule("Group is not archived"));
        }
        self.groups[index].archived_at = None;
        let group = self.groups[index].clone();
        self.group_lifecycle(actor_id, &group, "group.restored", "restored");
        Ok(group)
    }

    fn group_lifecycle(&mut self, actor_id: &str, group: &Group, action: &str, verb: &str) {
        let summary = format!("{} {} group {}", self.display_name(actor_id), verb, group.name);
        self.record(
            NewAuditEntry::new(actor_id, action, "group", summary)
                .entity_id(&group.id)
                .metadata(json!({ "groupId": group.id, "name": group.name })),
        );
    }
}
