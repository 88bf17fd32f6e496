//! Session token service
//!
//! Login issues an HMAC-signed token carrying the account's id, display
//! name, and role; the middleware validates it on every protected request.
//! The role travels inside the signature, so a client cannot edit its way
//! into another view.

use anyhow::Result;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::models::user::Role;

/// Session token configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC signing secret
    pub secret: String,
    /// Session token lifetime in seconds (default: 8 hours)
    pub session_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: signing secret (required)
    /// - `JWT_SESSION_EXPIRY`: token lifetime in seconds (default: 28800)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        let session_expiry = std::env::var("JWT_SESSION_EXPIRY")
            .unwrap_or_else(|_| "28800".to_string())
            .parse()
            .unwrap_or(28800);

        Ok(JwtConfig {
            secret,
            session_expiry,
        })
    }
}

/// Claims carried by a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: Uuid,
    /// Display name shown by the client
    pub fullname: String,
    /// Access role; the server-side source of truth for gating
    pub role: Role,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Session token service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new session token service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Issue a session token for an authenticated account
    pub fn issue(&self, user_id: Uuid, full_name: &str, role: Role) -> Result<String> {
        let now = unix_now()?;

        let claims = Claims {
            sub: user_id,
            fullname: full_name.to_string(),
            role,
            iat: now,
            exp: now + self.config.session_expiry,
        };

        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?;
        Ok(token)
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Session token lifetime in seconds
    pub fn session_expiry(&self) -> u64 {
        self.config.session_expiry
    }
}

/// Seconds since the Unix epoch
pub fn unix_now() -> Result<u64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
        .as_secs();
    Ok(now)
}
