//! Invitations to join the church

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::{new_id, DataStore};
use crate::models::{
    CreateInvitationRequest, Invitation, InvitationStatus, NewAuditEntry, UserRoleAssignment,
    UserStatus,
};
use crate::utils::validation::same_email;
use crate::utils::{StoreError, StoreResult};

const INVITATION_TTL_DAYS: i64 = 7;

/// Pending invitations past their expiry read back as expired
fn as_seen_at(invitation: &Invitation, now: DateTime<Utc>) -> Invitation {
    let mut seen = invitation.clone();
    if seen.status == InvitationStatus::Pending && seen.is_expired_at(now) {
        seen.status = InvitationStatus::Expired;
    }
    seen
}

impl DataStore {
    fn invitation_index_by_token(&self, token: &str) -> StoreResult<usize> {
        self.invitations
            .iter()
            .position(|i| i.invitation_token == token)
            .ok_or_else(|| StoreError::missing("Invitation"))
    }

    pub fn create_invitation(
        &mut self,
        actor_id: &str,
        input: CreateInvitationRequest,
    ) -> StoreResult<Invitation> {
        self.create_invitation_at(actor_id, input, Utc::now())
    }

    pub fn create_invitation_at(
        &mut self,
        actor_id: &str,
        input: CreateInvitationRequest,
        now: DateTime<Utc>,
    ) -> StoreResult<Invitation> {
        let email = input.email.trim().to_lowercase();
        let role_id = match input.role_id.as_deref() {
            Some(identifier) => Some(
                self.find_role(identifier)
                    .map(|r| r.id.clone())
                    .ok_or_else(|| StoreError::missing("Role"))?,
            ),
            None => None,
        };
        let already_pending = self.invitations.iter().any(|i| {
            i.status == InvitationStatus::Pending && !i.is_expired_at(now) && i.email == email
        });
        if already_pending {
            return Err(StoreError::Conflict(
                "A pending invitation already exists for that email".into(),
            ));
        }

        let invitation = Invitation {
            id: new_id("invitation"),
            church_id: self.church.id.clone(),
            email,
            role_id,
            invitation_token: Uuid::new_v4().to_string(),
            kind: input.kind,
            status: InvitationStatus::Pending,
            invited_by: actor_id.to_string(),
            expires_at: now + Duration::days(INVITATION_TTL_DAYS),
            created_at: now,
            updated_at: now,
        };

        let summary = format!("{} invited {}", self.display_name(actor_id), invitation.email);
        self.invitations.push(invitation.clone());
        self.record(
            NewAuditEntry::new(actor_id, "invitation.created", "invitation", summary)
                .entity_id(&invitation.id)
                .metadata(json!({
                    "invitationId": invitation.id,
                    "email": invitation.email,
                    "roleId": invitation.role_id,
                    "type": invitation.kind,
                })),
        );
        Ok(invitation)
    }

    /// Newest first
    pub fn list_invitations(&self) -> Vec<Invitation> {
        let now = Utc::now();
        let mut invitations: Vec<Invitation> = self
            .invitations
            .iter()
            .filter(|i| i.church_id == self.church.id)
            .map(|i| as_seen_at(i, now))
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        invitations
    }

    pub fn get_invitation_by_token(&self, token: &str) -> StoreResult<Invitation> {
        let index = self.invitation_index_by_token(token)?;
        Ok(as_seen_at(&self.invitations[index], Utc::now()))
    }

    pub fn accept_invitation(&mut self, token: &str) -> StoreResult<Invitation> {
        self.accept_invitation_at(token, Utc::now())
    }

    /// Accept a pending invitation
    ///
    /// An existing directory entry with the invited email is activated and
    /// granted the invited role. An expired invitation is marked as such and
    /// refused.
    pub fn accept_invitation_at(&mut self, token: &str, now: DateTime<Utc>) -> StoreResult<Invitation> {
        let index = self.invitation_index_by_token(token)?;
        let invitation = &mut self.invitations[index];
        if invitation.status != InvitationStatus::Pending {
            return Err(StoreError::rule("Invitation is no longer pending"));
        }
        if invitation.is_expired_at(now) {
            invitation.status = InvitationStatus::Expired;
            invitation.updated_at = now;
            return Err(StoreError::rule("Invitation has expired"));
        }
        invitation.status = InvitationStatus::Accepted;
        invitation.updated_at = now;
        let accepted = invitation.clone();

        let church_id = self.church.id.clone();
        let invitee = self
            .users
            .iter_mut()
            .find(|u| !u.is_archived() && same_email(&u.primary_email, &accepted.email));
        let actor_id = match invitee {
            Some(user) => {
                if user.status == UserStatus::Invited {
                    user.status = UserStatus::Active;
                }
                if let Some(role_id) = &accepted.role_id {
                    if !user.has_role(role_id) {
                        user.roles.push(UserRoleAssignment {
                            church_id,
                            role_id: role_id.clone(),
                        });
                    }
                }
                user.id.clone()
            }
            None => accepted.email.clone(),
        };
        info!(invitation_id = %accepted.id, "Invitation accepted");

        let summary = format!("{} accepted an invitation", self.display_name(&actor_id));
        self.record(
            NewAuditEntry::new(&actor_id, "invitation.accepted", "invitation", summary)
                .entity_id(&accepted.id)
                .metadata(json!({
                    "invitationId": accepted.id,
                    "email": accepted.email,
                    "roleId": accepted.role_id,
                })),
        );
        Ok(accepted)
    }
}
