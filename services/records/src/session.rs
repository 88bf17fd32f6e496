//! Session lifecycle and role-based view routing
//!
//! A role string held by the browser is never trusted for gating. The
//! session is explicit and server-issued: login opens it (one Redis entry
//! per user), logout tears it down and revokes the token for its remaining
//! lifetime, and the landing view is derived from the authenticated role.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use common::cache::RedisPool;

use crate::models::user::Role;

/// Authenticated request context injected by the auth middleware
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub full_name: String,
    pub role: Role,
}

/// Bearer token the current request authenticated with
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Client route a manual login lands on
pub fn landing_route(role: Role) -> &'static str {
    match role {
        Role::Admin | Role::Registrar => "/dashboard",
        Role::Student => "/student",
    }
}

/// Client route a federated login lands on
///
/// Federated accounts sign in as guests unless an administrator has promoted
/// them to staff through registration.
pub fn federated_landing_route(role: Role) -> &'static str {
    match role {
        Role::Admin | Role::Registrar => "/dashboard",
        Role::Student => "/guestdashboard",
    }
}

/// Server-side session registry backed by Redis
#[derive(Clone)]
pub struct SessionManager {
    redis: Arc<RedisPool>,
    session_ttl: u64,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(redis: Arc<RedisPool>, session_ttl: u64) -> Self {
        Self { redis, session_ttl }
    }

    /// Record a fresh session at login
    pub async fn open(&self, user_id: Uuid, token: &str) -> Result<()> {
        info!("Opening session for user {}", user_id);

        self.redis
            .set(&session_key(user_id), token, Some(self.session_ttl))
            .await
    }

    /// Tear down a session at logout
    ///
    /// The token stays revoked for its remaining lifetime, so a copy held by
    /// the client cannot be replayed after logout.
    pub async fn close(&self, user_id: Uuid, token: &str, remaining_ttl: u64) -> Result<()> {
        info!("Closing session for user {}", user_id);

        self.redis
            .set(&revocation_key(token), "1", Some(remaining_ttl.max(1)))
            .await?;
        self.redis.delete(&session_key(user_id)).await
    }

    /// Whether a token has been revoked by logout
    pub async fn is_revoked(&self, token: &str) -> Result<bool> {
        Ok(self.redis.get(&revocation_key(token)).await?.is_some())
    }
}

fn session_key(user_id: Uuid) -> String {
    format!("session:{user_id}")
}

fn revocation_key(token: &str) -> String {
    format!("revoked_token:{token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_land_on_the_dashboard() {
        assert_eq!(landing_route(Role::Admin), "/dashboard");
        assert_eq!(landing_route(Role::Registrar), "/dashboard");
        assert_eq!(federated_landing_route(Role::Admin), "/dashboard");
    }

    #[test]
    fn students_land_on_their_profile() {
        assert_eq!(landing_route(Role::Student), "/student");
    }

    #[test]
    fn federated_students_land_on_the_guest_view() {
        assert_eq!(federated_landing_route(Role::Student), "/guestdashboard");
    }
}
