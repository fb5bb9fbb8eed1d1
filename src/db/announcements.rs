//! Announcement and read receipt operations

use chrono::Utc;
use serde_json::json;

use super::{new_id, DataStore};
use crate::models::{
    Announcement, AnnouncementRead, AnnouncementView, Audience, CreateAnnouncementRequest,
    NewAuditEntry, UpdateAnnouncementRequest,
};
use crate::services::ChangeSet;
use crate::utils::{StoreError, StoreResult};

impl DataStore {
    fn announcement_index(&self, id: &str) -> StoreResult<usize> {
        self.announcements
            .iter()
            .position(|a| a.id == id && a.archived_at.is_none())
            .ok_or_else(|| StoreError::missing("Announcement"))
    }

    fn any_announcement_index(&self, id: &str) -> StoreResult<usize> {
        self.announcements
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| StoreError::missing("Announcement"))
    }

    fn announcement_view(&self, announcement: &Announcement) -> AnnouncementView {
        AnnouncementView {
            announcement: announcement.clone(),
            reads: self
                .announcement_reads
                .iter()
                .filter(|r| r.announcement_id == announcement.id)
                .cloned()
                .collect(),
        }
    }

    fn ensure_groups_exist(&self, group_ids: &[String]) -> StoreResult<()> {
        let live = |id: &String| {
            self.groups
                .iter()
                .any(|g| &g.id == id && g.archived_at.is_none())
        };
        if group_ids.iter().all(live) {
            Ok(())
        } else {
            Err(StoreError::missing("Group"))
        }
    }

    /// Newest publish date first, each with its read receipts
    pub fn list_announcements(&self) -> Vec<AnnouncementView> {
        let mut announcements: Vec<&Announcement> = self
            .announcements
            .iter()
            .filter(|a| a.church_id == self.church.id && a.archived_at.is_none())
            .collect();
        announcements.sort_by(|a, b| b.publish_at.cmp(&a.publish_at));
        announcements
            .into_iter()
            .map(|a| self.announcement_view(a))
            .collect()
    }

    pub fn get_announcement(&self, id: &str) -> StoreResult<AnnouncementView> {
        let index = self.announcement_index(id)?;
        Ok(self.announcement_view(&self.announcements[index]))
    }

    pub fn create_announcement(
        &mut self,
        actor_id: &str,
        input: CreateAnnouncementRequest,
    ) -> StoreResult<AnnouncementView> {
        let group_ids = match input.audience {
            Audience::Custom => input.group_ids,
            Audience::All => None,
        };
        if let Some(ids) = &group_ids {
            self.ensure_groups_exist(ids)?;
        }

        let announcement = Announcement {
            id: new_id("announcement"),
            church_id: self.church.id.clone(),
            title: input.title.trim().to_string(),
            body: input.body,
            audience: input.audience,
            group_ids,
            publish_at: input.publish_at.unwrap_or_else(Utc::now),
            expire_at: input.expire_at,
            archived_at: None,
        };

        let summary = format!(
            "{} published announcement \"{}\"",
            self.display_name(actor_id),
            announcement.title
        );
        self.announcements.push(announcement.clone());
        self.record(
            NewAuditEntry::new(actor_id, "announcement.created", "announcement", summary)
                .entity_id(&announcement.id)
                .metadata(json!({
                    "announcementId": announcement.id,
                    "audience": announcement.audience,
                    "groupIds": announcement.group_ids,
                })),
        );
        Ok(self.announcement_view(&announcement))
    }

    pub fn update_announcement(
        &mut self,
        actor_id: &str,
        id: &str,
        input: UpdateAnnouncementRequest,
    ) -> StoreResult<AnnouncementView> {
        let index = self.announcement_index(id)?;
        if let Some(ids) = &input.group_ids {
            self.ensure_groups_exist(ids)?;
        }

        let announcement = &mut self.announcements[index];
        let mut changes = ChangeSet::new();
        changes.track("title", &mut announcement.title, input.title.map(|t| t.trim().to_string()));
        changes.track("body", &mut announcement.body, input.body);
        changes.track("audience", &mut announcement.audience, input.audience);

        // group targeting only survives for a custom audience
        let group_ids = match announcement.audience {
            Audience::All => Some(None),
            Audience::Custom => input.group_ids.map(Some),
        };
        changes.track("groupIds", &mut announcement.group_ids, group_ids);
        changes.track("publishAt", &mut announcement.publish_at, input.publish_at);
        changes.track("expireAt", &mut announcement.expire_at, input.expire_at);
        let updated = announcement.clone();

        if let Some(diff) = changes.into_diff() {
            let summary = format!(
                "{} updated announcement \"{}\"",
                self.display_name(actor_id),
                updated.title
            );
            self.record(
                NewAuditEntry::new(actor_id, "announcement.updated", "announcement", summary)
                    .entity_id(id)
                    .metadata(json!({ "announcementId": id }))
                    .diff(Some(diff)),
            );
        }
        Ok(self.announcement_view(&updated))
    }

    /// Delete an announcement and its read receipts
    pub fn delete_announcement(&mut self, actor_id: &str, id: &str) -> StoreResult<()> {
        let index = self.any_announcement_index(id)?;
        let announcement = self.announcements.remove(index);
        self.announcement_reads.retain(|r| r.announcement_id != id);

        let summary = format!(
            "{} deleted announcement \"{}\"",
            self.display_name(actor_id),
            announcement.title
        );
        self.record(
            NewAuditEntry::new(actor_id, "announcement.deleted", "announcement", summary)
                .entity_id(id)
                .metadata(json!({ "announcementId": id, "title": announcement.title })),
        );
        Ok(())
    }

    /// Record that `user_id` read the announcement; repeat reads return the first receipt
    pub fn mark_announcement_read(
        &mut self,
        announcement_id: &str,
        user_id: &str,
    ) -> StoreResult<AnnouncementRead> {
        let index = self.announcement_index(announcement_id)?;
        if let Some(existing) = self
            .announcement_reads
            .iter()
            .find(|r| r.announcement_id == announcement_id && r.user_id == user_id)
        {
            return Ok(existing.clone());
        }
        let title = self.announcements[index].title.clone();

        let read = AnnouncementRead {
            announcement_id: announcement_id.to_string(),
            user_id: user_id.to_string(),
            read_at: Utc::now(),
        };
        self.announcement_reads.push(read.clone());

        let summary = format!("{} read announcement \"{}\"", self.display_name(user_id), title);
        self.record(
            NewAuditEntry::new(user_id, "announcement.read", "announcement", summary)
                .entity_id(announcement_id)
                .metadata(json!({ "userId": user_id, "announcementId": announcement_id })),
        );
        Ok(read)
    }

    pub fn list_archived_announcements(&self) -> Vec<AnnouncementView> {
        let mut archived: Vec<&Announcement> = self
            .announcements
            .iter()
            .filter(|a| a.church_id == self.church.id && a.archived_at.is_some())
            .collect();
        archived.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));
        archived
            .into_iter()
            .map(|a| self.announcement_view(a))
            .collect()
    }

    pub fn archive_announcement(&mut self, actor_id: &str, id: &str) -> StoreResult<AnnouncementView> {
        let index = self.any_announcement_index(id)?;
        if self.announcements[index].archived_at.is_some() {
            return Err(StoreError::rule("Announcement is already archived"));
        }
        self.announcements[index].archived_at = Some(Utc::now());
        let announcement = self.announcements[index].clone();
        self.announcement_lifecycle(actor_id, &announcement, "announcement.archived", "archived");
        Ok(self.announcement_view(&announcement))
    }

    pub fn restore_announcement(&mut self, actor_id: &str, id: &str) -> StoreResult<AnnouncementView> {
        let index = self.any_announcement_index(id)?;
        if self.announcements[index].archived_at.is_none() {
            return Err(StoreError::rule("Announcement is not archived"));
        }
        self.announcements[index].archived_at = None;
        let announcement = self.announcements[index].clone();
        self.announcement_lifecycle(actor_id, &announcement, "announcement.restored", "restored");
        Ok(self.announcement_view(&announcement))
    }

    fn announcement_lifecycle(
        &mut self,
        actor_id: &str,
        announcement: &Announcement,
        action: &str,
        verb: &str,
    ) {
        let summary = format!(
            "{} {} announcement \"{}\"",
            self.display_name(actor_id),
            verb,
            announcement.title
        );
        self.record(
            NewAuditEntry::new(actor_id, action, "announcement", summary)
                .entity_id(&announcement.id)
                .metadata(json!({ "announcementId": announcement.id, "title": announcement.title })),
        );
    }
}
