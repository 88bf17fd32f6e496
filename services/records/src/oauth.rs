//! Google ID-token verification
//!
//! The browser hands over the ID token issued by Google Sign-In. Before
//! anything downstream trusts the subject it names, the token is confirmed
//! against Google's tokeninfo endpoint and its audience is checked against
//! our configured client id.

use anyhow::Result;
use serde::Deserialize;
use tracing::info;

/// Google OAuth configuration
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth client id the tokens must be issued for
    pub client_id: String,
    /// Verification endpoint, overridable for tests
    pub tokeninfo_url: String,
}

impl GoogleConfig {
    /// Create a new GoogleConfig from environment variables
    ///
    /// # Environment Variables
    /// - `GOOGLE_CLIENT_ID`: OAuth client id (required)
    /// - `GOOGLE_TOKENINFO_URL`: verification endpoint (default: Google's)
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID")
            .map_err(|_| anyhow::anyhow!("GOOGLE_CLIENT_ID environment variable not set"))?;

        let tokeninfo_url = std::env::var("GOOGLE_TOKENINFO_URL")
            .unwrap_or_else(|_| "https://oauth2.googleapis.com/tokeninfo".to_string());

        Ok(GoogleConfig {
            client_id,
            tokeninfo_url,
        })
    }
}

/// Identity assertion confirmed by the provider
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// Stable external subject id
    pub subject: String,
    pub email: String,
    pub full_name: String,
}

/// Fields of the tokeninfo response this service cares about
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    name: String,
}

/// Verifies Google ID tokens against the tokeninfo endpoint
#[derive(Clone)]
pub struct GoogleVerifier {
    http: reqwest::Client,
    config: GoogleConfig,
}

impl GoogleVerifier {
    /// Create a new verifier
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Confirm a token with Google and check it was issued for this client
    pub async fn verify_id_token(&self, token: &str) -> Result<VerifiedIdentity> {
        let response = self
            .http
            .get(&self.config.tokeninfo_url)
            .query(&[("id_token", token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Token verification failed: {}",
                response.status()
            ));
        }

        let token_info: TokenInfo = response.json().await?;

        if token_info.aud != self.config.client_id {
            return Err(anyhow::anyhow!("Token issued for a different client"));
        }

        info!("Verified federated identity for subject {}", token_info.sub);

        Ok(VerifiedIdentity {
            subject: token_info.sub,
            email: token_info.email,
            full_name: token_info.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokeninfo_deserializes_expected_fields() {
        let body = r#"{
            "aud": "client-123.apps.googleusercontent.com",
            "sub": "109876543210",
            "email": "guest@example.com",
            "email_verified": "true",
            "name": "Guest User",
            "exp": "1714000000"
        }"#;

        let info: TokenInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.aud, "client-123.apps.googleusercontent.com");
        assert_eq!(info.sub, "109876543210");
        assert_eq!(info.email, "guest@example.com");
        assert_eq!(info.name, "Guest User");
    }

    #[test]
    fn tokeninfo_tolerates_missing_profile_fields() {
        let body = r#"{"aud": "client-123", "sub": "42"}"#;
        let info: TokenInfo = serde_json::from_str(body).unwrap();
        assert!(info.email.is_empty());
        assert!(info.name.is_empty());
    }
}
