use core_config::{ConfigError, FromEnv, env_required, parse_env};

const MIN_SECRET_LEN: usize = 32;
const DEFAULT_ACCESS_TTL_SECS: i64 = 3600;
const MAX_ACCESS_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// JWT signing configuration.
///
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `JWT_ACCESS_TTL_SECS` (default 3600, at most one year)
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_ttl_secs: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .finish()
    }
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        check_secret(&secret)?;
        Ok(Self {
            secret,
            access_token_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
        })
    }

    pub fn with_access_ttl(mut self, secs: i64) -> Self {
        self.access_token_ttl_secs = secs;
        self
    }
}

fn check_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ParseError {
            key: "JWT_SECRET".to_string(),
            details: format!(
                "must be at least {} characters (got {}). Generate one with: openssl rand -base64 32",
                MIN_SECRET_LEN,
                secret.len()
            ),
        });
    }
    Ok(())
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        check_secret(&secret)?;

        let access_token_ttl_secs = parse_env("JWT_ACCESS_TTL_SECS", DEFAULT_ACCESS_TTL_SECS)?;
        if !(1..=MAX_ACCESS_TTL_SECS).contains(&access_token_ttl_secs) {
            return Err(ConfigError::ParseError {
                key: "JWT_ACCESS_TTL_SECS".to_string(),
                details: format!(
                    "must be between 1 and {} seconds (got {})",
                    MAX_ACCESS_TTL_SECS, access_token_ttl_secs
                ),
            });
        }

        Ok(Self {
            secret,
            access_token_ttl_secs,
        })
    }
}
