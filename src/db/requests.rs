//! Request types and member requests
//!
//! Built-in request types can only be reordered. Custom types may be renamed
//! and archived, but not while requests filed under them are still open.

use chrono::Utc;
use serde_json::json;

use super::{new_id, DataStore};
use crate::models::{
    CreateMemberRequest, CreateRequestTypeRequest, MemberRequest, NewAuditEntry, RequestStatus,
    RequestType, RequestTypeStatus, UpdateMemberRequest, UpdateRequestTypeRequest,
};
use crate::services::ChangeSet;
use crate::utils::{StoreError, StoreResult};

const NAME_REQUIRED: &str = "Request type name is required.";

impl DataStore {
    fn request_type_index(&self, id: &str) -> StoreResult<usize> {
        self.request_types
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::missing("Request type"))
    }

    fn request_index(&self, id: &str) -> StoreResult<usize> {
        self.requests
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::missing("Request"))
    }

    fn request_type_name_taken(&self, name: &str, except_id: Option<&str>) -> bool {
        self.request_types.iter().any(|t| {
            Some(t.id.as_str()) != except_id
                && t.church_id == self.church.id
                && t.name.eq_ignore_ascii_case(name)
        })
    }

    /// Request types in display order
    pub fn list_request_types(&self, include_archived: bool) -> Vec<RequestType> {
        let mut types: Vec<RequestType> = self
            .request_types
            .iter()
            .filter(|t| t.church_id == self.church.id)
            .filter(|t| include_archived || t.status == RequestTypeStatus::Active)
            .cloned()
            .collect();
        types.sort_by_key(|t| t.display_order);
        types
    }

    pub fn create_request_type(
        &mut self,
        actor_id: &str,
        input: CreateRequestTypeRequest,
    ) -> StoreResult<RequestType> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::rule(NAME_REQUIRED));
        }
        if self.request_type_name_taken(&name, None) {
            return Err(StoreError::DuplicateName(
                "A request type with that name already exists.".into(),
            ));
        }

        let now = Utc::now();
        let display_order = self
            .request_types
            .iter()
            .map(|t| t.display_order)
            .max()
            .unwrap_or(0)
            + 1;
        let request_type = RequestType {
            id: new_id("req-type"),
            church_id: self.church.id.clone(),
            name,
            description: input.description,
            status: RequestTypeStatus::Active,
            is_built_in: false,
            display_order,
            has_confidential_field: input.has_confidential_field,
            created_at: now,
            updated_at: now,
        };

        let summary = format!(
            "{} created a new request type: {}",
            self.display_name(actor_id),
            request_type.name
        );
        self.request_types.push(request_type.clone());
        self.record(
            NewAuditEntry::new(actor_id, "requestType.created", "requestType", summary)
                .entity_id(&request_type.id)
                .metadata(json!({
                    "requestTypeId": request_type.id,
                    "name": request_type.name,
                })),
        );
        Ok(request_type)
    }

    pub fn update_request_type(
        &mut self,
        actor_id: &str,
        id: &str,
        input: UpdateRequestTypeRequest,
    ) -> StoreResult<RequestType> {
        let index = self.request_type_index(id)?;
        if self.request_types[index].is_built_in {
            return Err(StoreError::rule("Cannot edit a built-in request type"));
        }
        let name = match input.name.map(|n| n.trim().to_string()) {
            Some(name) if name.is_empty() => return Err(StoreError::rule(NAME_REQUIRED)),
            Some(name) if self.request_type_name_taken(&name, Some(id)) => {
                return Err(StoreError::DuplicateName(
                    "A request type with that name already exists.".into(),
                ))
            }
            other => other,
        };

        let request_type = &mut self.request_types[index];
        let previous_name = request_type.name.clone();
        let mut changes = ChangeSet::new();
        changes.track("name", &mut request_type.name, name);
        changes.track("description", &mut request_type.description, input.description);
        changes.track(
            "hasConfidentialField",
            &mut request_type.has_confidential_field,
            input.has_confidential_field,
        );
        if !changes.is_empty() {
            request_type.updated_at = Utc::now();
        }
        let updated = request_type.clone();

        if let Some(diff) = changes.into_diff() {
            let actor = self.display_name(actor_id);
            let summary = if diff.contains_key("name") {
                format!(
                    "{} renamed request type from \"{}\" to \"{}\"",
                    actor, previous_name, updated.name
                )
            } else {
                format!("{} updated request type \"{}\"", actor, updated.name)
            };
            self.record(
                NewAuditEntry::new(actor_id, "requestType.updated", "requestType", summary)
                    .entity_id(id)
                    .metadata(json!({ "requestTypeId": id }))
                    .diff(Some(diff)),
            );
        }
        Ok(updated)
    }

    pub fn archive_request_type(&mut self, actor_id: &str, id: &str) -> StoreResult<RequestType> {
        let index = self.request_type_index(id)?;
        let request_type = &self.request_types[index];
        if request_type.is_built_in {
            return Err(StoreError::rule("Cannot archive a built-in request type"));
        }
        if request_type.status == RequestTypeStatus::Archived {
            return Err(StoreError::rule("Request type is already archived"));
        }
        let has_open_requests = self
            .requests
            .iter()
            .any(|r| r.request_type_id == id && r.status != RequestStatus::Closed);
        if has_open_requests {
            return Err(StoreError::rule(
                "Cannot archive a request type with open requests",
            ));
        }

        let request_type = &mut self.request_types[index];
        request_type.status = RequestTypeStatus::Archived;
        request_type.updated_at = Utc::now();
        let archived = request_type.clone();

        let summary = format!(
            "{} archived request type \"{}\"",
            self.display_name(actor_id),
            archived.name
        );
        self.record(
            NewAuditEntry::new(actor_id, "requestType.archived", "requestType", summary)
                .entity_id(id)
                .metadata(json!({ "requestTypeId": id, "name": archived.name })),
        );
        Ok(archived)
    }

    /// Set a request type's status; archiving goes through the archive rules
    pub fn update_request_type_status(
        &mut self,
        actor_id: &str,
        id: &str,
        status: RequestTypeStatus,
    ) -> StoreResult<RequestType> {
        if status == RequestTypeStatus::Archived {
            return self.archive_request_type(actor_id, id);
        }
        let index = self.request_type_index(id)?;
        let request_type = &mut self.request_types[index];
        let mut changes = ChangeSet::new();
        if changes.track("status", &mut request_type.status, Some(status)) {
            request_type.updated_at = Utc::now();
        }
        let updated = request_type.clone();

        if let Some(diff) = changes.into_diff() {
            let summary = format!(
                "{} reactivated request type \"{}\"",
                self.display_name(actor_id),
                updated.name
            );
            self.record(
                NewAuditEntry::new(actor_id, "requestType.status.updated", "requestType", summary)
                    .entity_id(id)
                    .metadata(json!({ "requestTypeId": id, "status": updated.status }))
                    .diff(Some(diff)),
            );
        }
        Ok(updated)
    }

    /// Listed ids take the leading positions in the given order; the rest follow
    pub fn reorder_request_types(
        &mut self,
        actor_id: &str,
        ids: &[String],
    ) -> StoreResult<Vec<RequestType>> {
        for id in ids {
            self.request_type_index(id)?;
        }

        let mut rest: Vec<(u32, String)> = self
            .request_types
            .iter()
            .filter(|t| !ids.contains(&t.id))
            .map(|t| (t.display_order, t.id.clone()))
            .collect();
        rest.sort();
        let order: Vec<String> = ids
            .iter()
            .cloned()
            .chain(rest.into_iter().map(|(_, id)| id))
            .collect();

        let now = Utc::now();
        for (position, id) in (1..).zip(&order) {
            if let Some(request_type) = self.request_types.iter_mut().find(|t| &t.id == id) {
                if request_type.display_order != position {
                    request_type.display_order = position;
                    request_type.updated_at = now;
                }
            }
        }

        let summary = format!("{} reordered request types", self.display_name(actor_id));
        self.record(
            NewAuditEntry::new(actor_id, "requestType.reordered", "requestType", summary)
                .metadata(json!({ "order": order })),
        );
        Ok(self.list_request_types(true))
    }

    /// Every request when `owner` is `None`, otherwise only that member's; newest first
    pub fn list_requests(&self, owner: Option<&str>) -> Vec<MemberRequest> {
        let mut requests: Vec<MemberRequest> = self
            .requests
            .iter()
            .filter(|r| r.church_id == self.church.id)
            .filter(|r| owner.map_or(true, |o| r.user_id == o))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }

    pub fn get_request(&self, id: &str) -> StoreResult<MemberRequest> {
        let index = self.request_index(id)?;
        Ok(self.requests[index].clone())
    }

    /// File a request; confidentiality only sticks when the type offers it
    pub fn create_request(
        &mut self,
        actor_id: &str,
        input: CreateMemberRequest,
    ) -> StoreResult<MemberRequest> {
        let index = self.request_type_index(&input.request_type_id)?;
        let request_type = &self.request_types[index];
        if request_type.status == RequestTypeStatus::Archived {
            return Err(StoreError::rule("Request type is archived"));
        }
        let is_confidential = input.is_confidential && request_type.has_confidential_field;

        let now = Utc::now();
        let request = MemberRequest {
            id: new_id("req"),
            church_id: self.church.id.clone(),
            user_id: actor_id.to_string(),
            request_type_id: input.request_type_id,
            title: input.title.trim().to_string(),
            body: input.body,
            is_confidential,
            status: RequestStatus::Pending,
            assignee_id: None,
            created_at: now,
            updated_at: now,
        };

        let summary = format!("{} created a new request", self.display_name(actor_id));
        self.requests.push(request.clone());
        self.record(
            NewAuditEntry::new(actor_id, "request.created", "request", summary)
                .entity_id(&request.id)
                .metadata(json!({
                    "requestId": request.id,
                    "requestTypeId": request.request_type_id,
                    "isConfidential": request.is_confidential,
                })),
        );
        Ok(request)
    }

    pub fn update_request(
        &mut self,
        actor_id: &str,
        id: &str,
        input: UpdateMemberRequest,
    ) -> StoreResult<MemberRequest> {
        let index = self.request_index(id)?;
        if let Some(Some(assignee)) = &input.assignee_id {
            if self.live_user(assignee).is_none() {
                return Err(StoreError::missing("User"));
            }
        }

        let request = &mut self.requests[index];
        let mut changes = ChangeSet::new();
        changes.track("status", &mut request.status, input.status);
        changes.track("assigneeId", &mut request.assignee_id, input.assignee_id);
        if !changes.is_empty() {
            request.updated_at = Utc::now();
        }
        let updated = request.clone();

        if let Some(diff) = changes.into_diff() {
            let summary = format!(
                "{} updated a request from {}",
                self.display_name(actor_id),
                self.display_name(&updated.user_id)
            );
            self.record(
                NewAuditEntry::new(actor_id, "request.updated", "request", summary)
                    .entity_id(id)
                    .metadata(json!({ "requestId": id, "status": updated.status }))
                    .diff(Some(diff)),
            );
        }
        Ok(updated)
    }
}
