//! Identity resolution: manual login, federated login, and registration
//!
//! Every path terminates in an authenticated principal, a rejection, or a
//! propagated store error. Federated logins trust the assertion they are
//! handed; token verification happens upstream in [`crate::oauth`].

use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use crate::models::user::{Role, UserAccount};
use crate::oauth::VerifiedIdentity;
use crate::repositories::UserRepository;

const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// A resolved, authenticated principal
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user_id: Uuid,
    pub full_name: String,
    pub role: Role,
}

impl From<&UserAccount> for Authenticated {
    fn from(account: &UserAccount) -> Self {
        Self {
            user_id: account.id,
            full_name: account.full_name.clone(),
            role: account.role,
        }
    }
}

/// Terminal states of a single login attempt
#[derive(Debug)]
pub enum LoginOutcome {
    Authenticated(Authenticated),
    Rejected(&'static str),
}

/// Outcome of a registration attempt
#[derive(Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created,
    UsernameTaken,
}

/// Manual path: exact username lookup, then hash verification
///
/// An absent account and a wrong password produce the same rejection
/// message, so the response does not reveal which usernames exist.
pub async fn resolve_manual(
    users: &UserRepository,
    username: &str,
    password: &str,
) -> Result<LoginOutcome> {
    let Some(account) = users.find_by_username(username).await? else {
        return Ok(LoginOutcome::Rejected(INVALID_CREDENTIALS));
    };

    if !users.verify_password(&account, password).await? {
        return Ok(LoginOutcome::Rejected(INVALID_CREDENTIALS));
    }

    Ok(LoginOutcome::Authenticated((&account).into()))
}

/// Federated path: auto-provisions a student account on first sign-in
///
/// An existing account keeps its stored name and role; login never promotes
/// or demotes. Promotion happens through the registration path by an
/// administrator.
pub async fn resolve_federated(
    users: &UserRepository,
    identity: &VerifiedIdentity,
) -> Result<Authenticated> {
    if let Some(account) = users.find_by_federated_id(&identity.subject).await? {
        return Ok((&account).into());
    }

    info!("Provisioning federated account for subject {}", identity.subject);
    let account = users
        .insert_federated(&identity.full_name, &identity.email, &identity.subject)
        .await?;

    Ok((&account).into())
}

/// Registration path, distinct from login
///
/// The only uniqueness check is the username; the requested role is
/// whitelisted and silently defaults to student.
pub async fn register(
    users: &UserRepository,
    full_name: &str,
    username: &str,
    password: &str,
    requested_role: Option<&str>,
) -> Result<RegisterOutcome> {
    if users.find_by_username(username).await?.is_some() {
        return Ok(RegisterOutcome::UsernameTaken);
    }

    let role = Role::normalize(requested_role);
    users
        .insert_manual(full_name, username, password, role)
        .await?;

    Ok(RegisterOutcome::Created)
}
