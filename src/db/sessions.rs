//! Demo sign-in sessions

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::DataStore;
use crate::models::{AuthProvider, LoginResponse, Session, UserRoleAssignment, UserView};
use crate::utils::validation::same_email;
use crate::utils::{StoreError, StoreResult};

impl DataStore {
    /// Sign a seeded user in, optionally granting the requested role
    pub fn create_session(
        &mut self,
        email: &str,
        provider: AuthProvider,
        requested_role: Option<&str>,
    ) -> StoreResult<LoginResponse> {
        let index = self
            .users
            .iter()
            .position(|u| !u.is_archived() && same_email(&u.primary_email, email))
            .ok_or_else(|| {
                StoreError::NotFound(
                    "User not found for demo login. Use one of the seeded accounts.".into(),
                )
            })?;

        let granted = requested_role
            .and_then(|identifier| self.find_role(identifier))
            .map(|role| role.id.clone());
        let church_id = self.church.id.clone();
        let now = Utc::now();

        let user = &mut self.users[index];
        if let Some(role_id) = granted {
            if !user.has_role(&role_id) {
                user.roles.push(UserRoleAssignment { church_id, role_id });
            }
        }
        user.last_login_at = Some(now);

        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            provider,
            created_at: now,
        };
        info!(user_id = %session.user_id, provider = ?provider, "Demo session created");
        self.sessions.push(session.clone());

        let user = self.users[index].clone();
        Ok(LoginResponse {
            session,
            user: self.user_view(&user),
        })
    }

    pub fn session_by_token(&self, token: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.token == token)
    }

    /// The user behind a session token
    pub fn session_user(&self, token: &str) -> Option<UserView> {
        let session = self.session_by_token(token)?;
        self.live_user(&session.user_id).map(|u| self.user_view(u))
    }

    /// Returns `true` when a session was removed
    pub fn revoke_session(&mut self, token: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.token != token);
        self.sessions.len() != before
    }
}
