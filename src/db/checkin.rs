//! Children's ministry: child records and event check-ins

use chrono::Utc;
use serde_json::json;

use super::{new_id, DataStore};
use crate::models::{
    Checkin, CheckinFilter, CheckinStatus, CheckinView, Child, CreateCheckinRequest,
    CreateChildRequest, NewAuditEntry, UpdateCheckinRequest, UpdateChildRequest,
};
use crate::services::ChangeSet;
use crate::utils::{StoreError, StoreResult};

impl DataStore {
    fn child_index(&self, id: &str) -> StoreResult<usize> {
        self.children
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::missing("Child"))
    }

    fn checkin_index(&self, id: &str) -> StoreResult<usize> {
        self.checkins
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::missing("Check-in"))
    }

    pub fn list_children(&self, household_id: &str) -> StoreResult<Vec<Child>> {
        if self.live_household(household_id).is_none() {
            return Err(StoreError::missing("Household"));
        }
        Ok(self
            .children
            .iter()
            .filter(|c| c.household_id == household_id && c.deleted_at.is_none())
            .cloned()
            .collect())
    }

    pub fn get_child(&self, id: &str) -> StoreResult<Child> {
        let index = self.child_index(id)?;
        Ok(self.children[index].clone())
    }

    pub fn create_child(&mut self, actor_id: &str, input: CreateChildRequest) -> StoreResult<Child> {
        let household_name = self
            .live_household(&input.household_id)
            .map(|h| h.name.clone())
            .ok_or_else(|| StoreError::missing("Household"))?;

        let now = Utc::now();
        let child = Child {
            id: new_id("child"),
            household_id: input.household_id,
            full_name: input.full_name.trim().to_string(),
            date_of_birth: input.date_of_birth,
            allergies: input.allergies,
            medical_notes: input.medical_notes,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let summary = format!(
            "{} added a child to household {}",
            self.display_name(actor_id),
            household_name
        );
        self.children.push(child.clone());
        self.record(
            NewAuditEntry::new(actor_id, "child.created", "child", summary)
                .entity_id(&child.id)
                .metadata(json!({ "childId": child.id, "householdId": child.household_id })),
        );
        Ok(child)
    }

    pub fn update_child(
        &mut self,
        actor_id: &str,
        id: &str,
        input: UpdateChildRequest,
    ) -> StoreResult<Child> {
        let index = self.child_index(id)?;
        let child = &mut self.children[index];

        let mut changes = ChangeSet::new();
        changes.track("fullName", &mut child.full_name, input.full_name.map(|n| n.trim().to_string()));
        changes.track("dateOfBirth", &mut child.date_of_birth, input.date_of_birth);
        changes.track("allergies", &mut child.allergies, input.allergies);
        changes.track("medicalNotes", &mut child.medical_notes, input.medical_notes);
        if !changes.is_empty() {
            child.updated_at = Utc::now();
        }
        let updated = child.clone();

        if let Some(diff) = changes.into_diff() {
            let summary = format!(
                "{} updated information for child {}",
                self.display_name(actor_id),
                updated.full_name
            );
            self.record(
                NewAuditEntry::new(actor_id, "child.updated", "child", summary)
                    .entity_id(id)
                    .metadata(json!({ "childId": id, "householdId": updated.household_id }))
                    .diff(Some(diff)),
            );
        }
        Ok(updated)
    }

    fn set_child_deleted(&mut self, actor_id: &str, id: &str, deleted: bool) -> StoreResult<Child> {
        let index = self.child_index(id)?;
        let child = &mut self.children[index];
        match (deleted, child.deleted_at.is_some()) {
            (true, true) => return Err(StoreError::rule("Child is already deleted")),
            (false, false) => return Err(StoreError::rule("Child is not deleted")),
            _ => {}
        }
        let now = Utc::now();
        child.deleted_at = deleted.then_some(now);
        child.updated_at = now;
        let child = child.clone();

        let (action, verb) = if deleted {
            ("child.deleted", "removed")
        } else {
            ("child.restored", "restored")
        };
        let summary = format!("{} {} child {}", self.display_name(actor_id), verb, child.full_name);
        self.record(
            NewAuditEntry::new(actor_id, action, "child", summary)
                .entity_id(id)
                .metadata(json!({ "childId": id, "householdId": child.household_id })),
        );
        Ok(child)
    }

    /// Whether `user_id` lives in the household the child belongs to
    pub fn is_guardian_of(&self, user_id: &str, child_id: &str) -> bool {
        self.children
            .iter()
            .find(|c| c.id == child_id)
            .map_or(false, |child| self.belongs_to_household(user_id, &child.household_id))
    }

    /// Soft delete
    pub fn delete_child(&mut self, actor_id: &str, id: &str) -> StoreResult<Child> {
        self.set_child_deleted(actor_id, id, true)
    }

    pub fn restore_child(&mut self, actor_id: &str, id: &str) -> StoreResult<Child> {
        self.set_child_deleted(actor_id, id, false)
    }

    pub fn list_checkins(&self, filter: &CheckinFilter) -> Vec<CheckinView> {
        self.checkins
            .iter()
            .filter(|c| c.church_id == self.church.id)
            .filter(|c| filter.event_id.as_deref().map_or(true, |e| c.event_id == e))
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .map(|c| CheckinView {
                checkin: c.clone(),
                child: self.children.iter().find(|child| child.id == c.child_id).cloned(),
            })
            .collect()
    }

    /// Open a pending check-in for a child at an event
    pub fn create_checkin(&mut self, actor_id: &str, input: CreateCheckinRequest) -> StoreResult<Checkin> {
        if !self
            .events
            .iter()
            .any(|e| e.id == input.event_id && e.archived_at.is_none())
        {
            return Err(StoreError::missing("Event"));
        }
        let index = self.child_index(&input.child_id)?;
        if self.children[index].deleted_at.is_some() {
            return Err(StoreError::missing("Child"));
        }

        let checkin = Checkin {
            id: new_id("checkin"),
            church_id: self.church.id.clone(),
            event_id: input.event_id,
            child_id: input.child_id,
            status: CheckinStatus::Pending,
            checkin_time: None,
            checkout_time: None,
            checked_in_by: None,
            checked_out_by: None,
        };

        let summary = format!("{} initiated check-in for a child", self.display_name(actor_id));
        self.checkins.push(checkin.clone());
        self.record(
            NewAuditEntry::new(actor_id, "checkin.created", "checkin", summary)
                .entity_id(&checkin.id)
                .metadata(json!({
                    "checkinId": checkin.id,
                    "eventId": checkin.event_id,
                    "childId": checkin.child_id,
                })),
        );
        Ok(checkin)
    }

    /// Move a check-in along; entering a state stamps its time and actor when not supplied
    pub fn update_checkin(
        &mut self,
        actor_id: &str,
        id: &str,
        mut input: UpdateCheckinRequest,
    ) -> StoreResult<Checkin> {
        let index = self.checkin_index(id)?;
        let checkin = &mut self.checkins[index];
        let now = Utc::now();

        match input.status {
            Some(CheckinStatus::CheckedIn) if checkin.status != CheckinStatus::CheckedIn => {
                input.checkin_time.get_or_insert(now);
                input.checked_in_by.get_or_insert_with(|| actor_id.to_string());
            }
            Some(CheckinStatus::CheckedOut) if checkin.status != CheckinStatus::CheckedOut => {
                input.checkout_time.get_or_insert(now);
                input.checked_out_by.get_or_insert_with(|| actor_id.to_string());
            }
            _ => {}
        }

        let mut changes = ChangeSet::new();
        changes.track("status", &mut checkin.status, input.status);
        changes.track("checkinTime", &mut checkin.checkin_time, input.checkin_time.map(Some));
        changes.track("checkoutTime", &mut checkin.checkout_time, input.checkout_time.map(Some));
        changes.track("checkedInBy", &mut checkin.checked_in_by, input.checked_in_by.map(Some));
        changes.track("checkedOutBy", &mut checkin.checked_out_by, input.checked_out_by.map(Some));
        let updated = checkin.clone();

        if let Some(diff) = changes.into_diff() {
            let summary = format!("{} updated check-in status", self.display_name(actor_id));
            self.record(
                NewAuditEntry::new(actor_id, "checkin.updated", "checkin", summary)
                    .entity_id(id)
                    .metadata(json!({
                        "checkinId": id,
                        "childId": updated.child_id,
                        "status": updated.status,
                    }))
                    .diff(Some(diff)),
            );
        }
        Ok(updated)
    }
}
