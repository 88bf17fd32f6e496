//! User account model and role handling

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access role attached to every account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Registrar,
    Student,
}

impl Role {
    /// Whitelist a requested role; anything unrecognized (including absent)
    /// becomes `Student`
    pub fn normalize(input: Option<&str>) -> Self {
        match input.map(|r| r.trim().to_lowercase()).as_deref() {
            Some("admin") => Self::Admin,
            Some("registrar") => Self::Registrar,
            _ => Self::Student,
        }
    }

    /// Read back a role column value
    pub fn from_stored(value: &str) -> Self {
        Self::normalize(Some(value))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Registrar => "registrar",
            Self::Student => "student",
        }
    }

    /// Staff roles may mutate student records
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Admin | Self::Registrar)
    }
}

/// User account entity
///
/// Manual accounts carry a username and password hash; federated accounts
/// carry a federated id and email instead. The store does not enforce
/// exclusivity between the two.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub email: String,
    pub federated_id: String,
    pub created_at: DateTime<Utc>,
}
