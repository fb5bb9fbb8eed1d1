//! Event and attendance operations

use chrono::Utc;
use serde_json::json;

use super::{new_id, DataStore};
use crate::models::{
    AttendanceRecord, AttendanceStatus, CreateEventRequest, Event, NewAuditEntry,
    UpdateEventRequest,
};
use crate::services::ChangeSet;
use crate::utils::{StoreError, StoreResult};

const END_BEFORE_START: &str = "Event end time cannot be before its start time";

impl DataStore {
    fn event_index(&self, id: &str) -> StoreResult<usize> {
        self.events
            .iter()
            .position(|e| e.id == id && e.archived_at.is_none())
            .ok_or_else(|| StoreError::missing("Event"))
    }

    fn any_event_index(&self, id: &str) -> StoreResult<usize> {
        self.events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::missing("Event"))
    }

    fn ensure_group_exists(&self, group_id: Option<&str>) -> StoreResult<()> {
        match group_id {
            Some(id) if !self.groups.iter().any(|g| g.id == id && g.archived_at.is_none()) => {
                Err(StoreError::missing("Group"))
            }
            _ => Ok(()),
        }
    }

    /// Events in start order
    pub fn list_events(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.church_id == self.church.id && e.archived_at.is_none())
            .cloned()
            .collect();
        events.sort_by(|a, b| a.start_at.cmp(&b.start_at));
        events
    }

    pub fn get_event(&self, id: &str) -> StoreResult<Event> {
        let index = self.event_index(id)?;
        Ok(self.events[index].clone())
    }

    pub fn create_event(&mut self, actor_id: &str, input: CreateEventRequest) -> StoreResult<Event> {
        self.ensure_group_exists(input.group_id.as_deref())?;
        let end_at = input.end_at.unwrap_or(input.start_at);
        if end_at < input.start_at {
            return Err(StoreError::rule(END_BEFORE_START));
        }

        let event = Event {
            id: new_id("event"),
            church_id: self.church.id.clone(),
            title: input.title.trim().to_string(),
            description: input.description,
            start_at: input.start_at,
            end_at,
            location: input.location,
            visibility: input.visibility.unwrap_or_default(),
            group_id: input.group_id,
            tags: input.tags,
            attendance: Vec::new(),
            archived_at: None,
        };

        let summary = format!("{} created event {}", self.display_name(actor_id), event.title);
        self.events.push(event.clone());
        self.record(
            NewAuditEntry::new(actor_id, "event.created", "event", summary)
                .entity_id(&event.id)
                .metadata(json!({
                    "eventId": event.id,
                    "title": event.title,
                    "startAt": event.start_at,
                })),
        );
        Ok(event)
    }

    pub fn update_event(
        &mut self,
        actor_id: &str,
        id: &str,
        input: UpdateEventRequest,
    ) -> StoreResult<Event> {
        let index = self.event_index(id)?;
        if let Some(group_id) = &input.group_id {
            self.ensure_group_exists(group_id.as_deref())?;
        }

        let current = &self.events[index];
        let start_at = input.start_at.unwrap_or(current.start_at);
        let end_at = input.end_at.unwrap_or(current.end_at);
        if end_at < start_at {
            return Err(StoreError::rule(END_BEFORE_START));
        }

        let event = &mut self.events[index];
        let mut changes = ChangeSet::new();
        changes.track("title", &mut event.title, input.title.map(|t| t.trim().to_string()));
        changes.track("description", &mut event.description, input.description);
        changes.track("startAt", &mut event.start_at, input.start_at);
        changes.track("endAt", &mut event.end_at, input.end_at);
        changes.track("location", &mut event.location, input.location);
        changes.track("visibility", &mut event.visibility, input.visibility);
        changes.track("groupId", &mut event.group_id, input.group_id);
        changes.track("tags", &mut event.tags, input.tags);
        let updated = event.clone();

        if let Some(diff) = changes.into_diff() {
            let summary = format!("{} updated event {}", self.display_name(actor_id), updated.title);
            self.record(
                NewAuditEntry::new(actor_id, "event.updated", "event", summary)
                    .entity_id(id)
                    .metadata(json!({ "eventId": id }))
                    .diff(Some(diff)),
            );
        }
        Ok(updated)
    }

    /// Delete an event together with its check-ins
    pub fn delete_event(&mut self, actor_id: &str, id: &str) -> StoreResult<()> {
        let index = self.any_event_index(id)?;
        let event = self.events.remove(index);
        let before = self.checkins.len();
        self.checkins.retain(|c| c.event_id != id);
        let removed_checkins = before - self.checkins.len();

        let summary = format!("{} deleted event {}", self.display_name(actor_id), event.title);
        self.record(
            NewAuditEntry::new(actor_id, "event.deleted", "event", summary)
                .entity_id(id)
                .metadata(json!({
                    "eventId": id,
                    "title": event.title,
                    "removedCheckins": removed_checkins,
                })),
        );
        Ok(())
    }

    /// Upsert a user's attendance for an event
    ///
    /// `recorded_by` defaults to the attendee. A diff is attached only when an
    /// existing record changes status.
    pub fn record_attendance(
        &mut self,
        event_id: &str,
        user_id: &str,
        status: AttendanceStatus,
        note: Option<String>,
        recorded_by: Option<&str>,
    ) -> StoreResult<AttendanceRecord> {
        let index = self.event_index(event_id)?;
        if self.live_user(user_id).is_none() {
            return Err(StoreError::missing("User"));
        }
        let actor_id = recorded_by.unwrap_or(user_id).to_string();
        let attendee_name = self.display_name(user_id);
        let actor_name = self.display_name(&actor_id);

        let event = &mut self.events[index];
        let title = event.title.clone();
        let record = AttendanceRecord {
            event_id: event_id.to_string(),
            user_id: user_id.to_string(),
            status,
            note: note.clone(),
            recorded_by: actor_id.clone(),
            recorded_at: Utc::now(),
        };

        let mut changes = ChangeSet::new();
        let previous_status = match event.attendance.iter_mut().find(|a| a.user_id == user_id) {
            Some(existing) => {
                let previous = existing.status;
                changes.record("status", &previous, &status);
                *existing = record.clone();
                Some(previous)
            }
            None => {
                event.attendance.push(record.clone());
                None
            }
        };

        let summary = if actor_id == user_id {
            format!(
                "{} recorded their attendance as {} for {}",
                attendee_name, status, title
            )
        } else {
            format!("{} marked {} as {} for {}", actor_name, attendee_name, status, title)
        };
        self.record(
            NewAuditEntry::new(actor_id, "attendance.updated", "event", summary)
                .entity_id(event_id)
                .diff(changes.into_diff())
                .metadata(json!({
                    "userId": user_id,
                    "newStatus": status,
                    "previousStatus": previous_status,
                    "note": note,
                })),
        );
        Ok(record)
    }

    pub fn list_archived_events(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.church_id == self.church.id && e.archived_at.is_some())
            .cloned()
            .collect();
        events.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));
        events
    }

    /// Hide an event; attendance and check-ins are kept for a later restore
    pub fn archive_event(&mut self, actor_id: &str, id: &str) -> StoreResult<Event> {
        let index = self.any_event_index(id)?;
        if self.events[index].archived_at.is_some() {
            return Err(StoreError::rule("Event is already archived"));
        }
        self.events[index].archived_at = Some(Utc::now());
        let event = self.events[index].clone();
        self.event_lifecycle(actor_id, &event, "event.archived", "archived");
        Ok(event)
    }

    pub fn restore_event(&mut self, actor_id: &str, id: &str) -> StoreResult<Event> {
        let index = self.any_event_index(id)?;
        if self.events[index].archived_at.is_none() {
            return Err(StoreError::rule("Event is not archived"));
        }
        self.events[index].archived_at = None;
        let event = self.events[index].clone();
        self.event_lifecycle(actor_id, &event, "event.restored", "restored");
        Ok(event)
    }

    fn event_lifecycle(&mut self, actor_id: &str, event: &Event, action: &str, verb: &str) {
        let summary = format!("{} {} event {}", self.display_name(actor_id), verb, event.title);
        self.record(
            NewAuditEntry::new(actor_id, action, "event", summary)
                .entity_id(&event.id)
                .metadata(json!({ "eventId": event.id, "title": event.title })),
        );
    }
}
