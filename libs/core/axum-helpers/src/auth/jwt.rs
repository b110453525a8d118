use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token claims. `sub` is the numeric user id as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// HS256 token issuer and verifier.
#[derive(Clone)]
pub struct JwtAuth {
    secret: String,
    access_token_ttl_secs: i64,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        tracing::info!(
            ttl_secs = config.access_token_ttl_secs,
            "JWT auth initialized"
        );
        Self {
            secret: config.secret.clone(),
            access_token_ttl_secs: config.access_token_ttl_secs,
        }
    }

    pub fn access_token_ttl(&self) -> i64 {
        self.access_token_ttl_secs
    }

    pub fn create_access_token(&self, user_id: i64, email: &str, name: &str) -> eyre::Result<String> {
        let now = Utc::now();
        let expires_at = Duration::try_seconds(self.access_token_ttl_secs)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                eyre::eyre!(
                    "access token ttl of {}s is out of range",
                    self.access_token_ttl_secs
                )
            })?;

        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Checks signature and expiry, returning the decoded claims.
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(jsonwebtoken::Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }
}
