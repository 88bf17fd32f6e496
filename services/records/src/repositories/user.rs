//! User repository for database operations
//!
//! Accounts are created at registration or first federated sign-in and are
//! never updated or deleted afterwards. Passwords are only ever stored as
//! Argon2 hashes.

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use crate::models::user::{Role, UserAccount};

const USER_SELECT: &str = r#"
SELECT id, full_name, username, password_hash, role, email, federated_id, created_at
FROM users
"#;

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an account by exact username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
        let sql = format!("{USER_SELECT} WHERE username = $1");
        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    /// Find an account by its federated identity subject
    pub async fn find_by_federated_id(&self, subject: &str) -> Result<Option<UserAccount>> {
        let sql = format!("{USER_SELECT} WHERE federated_id = $1");
        let row = sqlx::query(&sql)
            .bind(subject)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    /// Create a manual account with a hashed password
    pub async fn insert_manual(
        &self,
        full_name: &str,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<UserAccount> {
        info!("Creating manual account for {}", username);

        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        let row = sqlx::query(
            r#"
            INSERT INTO users (full_name, username, password_hash, role, email, federated_id)
            VALUES ($1, $2, $3, $4, '', '')
            RETURNING id, full_name, username, password_hash, role, email, federated_id, created_at
            "#,
        )
        .bind(full_name)
        .bind(username)
        .bind(&password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(account_from_row(&row))
    }

    /// Create a federated account; always role `student`
    pub async fn insert_federated(
        &self,
        full_name: &str,
        email: &str,
        subject: &str,
    ) -> Result<UserAccount> {
        info!("Creating federated account for subject {}", subject);

        let row = sqlx::query(
            r#"
            INSERT INTO users (full_name, username, password_hash, role, email, federated_id)
            VALUES ($1, '', '', 'student', $2, $3)
            RETURNING id, full_name, username, password_hash, role, email, federated_id, created_at
            "#,
        )
        .bind(full_name)
        .bind(email)
        .bind(subject)
        .fetch_one(&self.pool)
        .await?;

        Ok(account_from_row(&row))
    }

    /// Verify a password against an account's stored hash
    ///
    /// Federated-only accounts have no hash and never verify.
    pub async fn verify_password(&self, account: &UserAccount, password: &str) -> Result<bool> {
        if account.password_hash.is_empty() {
            return Ok(false);
        }

        let parsed_hash = PasswordHash::new(&account.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let argon2 = Argon2::default();
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

fn account_from_row(row: &PgRow) -> UserAccount {
    UserAccount {
        id: row.get("id"),
        full_name: row.get("full_name"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        role: Role::from_stored(row.get::<&str, _>("role")),
        email: row.get("email"),
        federated_id: row.get("federated_id"),
        created_at: row.get("created_at"),
    }
}
