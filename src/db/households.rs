//! Household operations

use chrono::Utc;
use serde_json::json;

use super::DataStore;
use crate::models::{Household, HouseholdDetail, HouseholdMember, NewAuditEntry, UpdateHouseholdRequest};
use crate::services::ChangeSet;
use crate::utils::{StoreError, StoreResult};

impl DataStore {
    pub fn list_households(&self) -> Vec<Household> {
        let mut households: Vec<Household> = self
            .households
            .iter()
            .filter(|h| h.church_id == self.church.id && h.archived_at.is_none())
            .cloned()
            .collect();
        households.sort_by(|a, b| a.name.cmp(&b.name));
        households
    }

    fn household_index(&self, id: &str) -> StoreResult<usize> {
        self.households
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| StoreError::missing("Household"))
    }

    /// Household with its members and (non-deleted) children
    pub fn get_household(&self, id: &str) -> StoreResult<HouseholdDetail> {
        let household = self
            .live_household(id)
            .cloned()
            .ok_or_else(|| StoreError::missing("Household"))?;

        let members = self
            .users
            .iter()
            .filter(|u| u.profile.household_id == id && !u.is_archived())
            .map(|u| HouseholdMember {
                user_id: u.id.clone(),
                name: u.display_name(),
                household_role: u.profile.household_role,
            })
            .collect();

        let children = self
            .children
            .iter()
            .filter(|c| c.household_id == id && c.deleted_at.is_none())
            .cloned()
            .collect();

        Ok(HouseholdDetail {
            household,
            members,
            children,
        })
    }

    pub fn update_household(
        &mut self,
        actor_id: &str,
        id: &str,
        input: UpdateHouseholdRequest,
    ) -> StoreResult<HouseholdDetail> {
        let household = self
            .households
            .iter_mut()
            .find(|h| h.id == id && h.archived_at.is_none())
            .ok_or_else(|| StoreError::missing("Household"))?;

        let mut changes = ChangeSet::new();
        changes.track("name", &mut household.name, input.name.map(|n| n.trim().to_string()));
        changes.track("address", &mut household.address, input.address);
        if !changes.is_empty() {
            household.updated_at = Utc::now();
        }
        let name = household.name.clone();

        if let Some(diff) = changes.into_diff() {
            let summary = format!("{} updated household {}", self.display_name(actor_id), name);
            self.record(
                NewAuditEntry::new(actor_id, "household.updated", "household", summary)
                    .entity_id(id)
                    .metadata(json!({ "householdId": id }))
                    .diff(Some(diff)),
            );
        }

        self.get_household(id)
    }

    pub fn list_archived_households(&self) -> Vec<Household> {
        let mut households: Vec<Household> = self
            .households
            .iter()
            .filter(|h| h.church_id == self.church.id && h.archived_at.is_some())
            .cloned()
            .collect();
        households.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));
        households
    }

    /// Hide a household; members and children keep pointing at it
    pub fn archive_household(&mut self, actor_id: &str, id: &str) -> StoreResult<Household> {
        let index = self.household_index(id)?;
        if self.households[index].archived_at.is_some() {
            return Err(StoreError::rule("Household is already archived"));
        }
        let now = Utc::now();
        self.households[index].archived_at = Some(now);
        self.households[index].updated_at = now;
        let household = self.households[index].clone();
        self.household_lifecycle(actor_id, &household, "household.archived", "archived");
        Ok(household)
    }

    pub fn restore_household(&mut self, actor_id: &str, id: &str) -> StoreResult<HouseholdDetail> {
        let index = self.household_index(id)?;
        if self.households[index].archived_at.is_none() {
            return Err(StoreError::rule("Household is not archived"));
        }
        self.households[index].archived_at = None;
        self.households[index].updated_at = Utc::now();
        let household = self.households[index].clone();
        self.household_lifecycle(actor_id, &household, "household.restored", "restored");
        self.get_household(id)
    }

    fn household_lifecycle(&mut self, actor_id: &str, household: &Household, action: &str, verb: &str) {
        let summary = format!(
            "{} {} household {}",
            self.display_name(actor_id),
            verb,
            household.name
        );
        self.record(
            NewAuditEntry::new(actor_id, action, "household", summary)
                .entity_id(&household.id)
                .metadata(json!({ "householdId": household.id, "name": household.name })),
        );
    }
}
