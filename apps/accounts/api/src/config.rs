use axum_helpers::JwtConfig;
use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_or_default, server::ServerConfig};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Where users and addresses are kept
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromEnv for StorageBackend {
    /// `STORAGE_BACKEND`: `postgres` (default) or `memory`
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env_or_default("STORAGE_BACKEND", "postgres");
        match raw.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(ConfigError::ParseError {
                key: "STORAGE_BACKEND".to_string(),
                details: format!("unknown backend '{}', expected 'postgres' or 'memory'", other),
            }),
        }
    }
}

/// Application-specific configuration
/// Composes shared config components from the `core_config`, `database` and `axum-helpers` libraries
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    /// Present only for the Postgres backend
    pub database: Option<PostgresConfig>,
    pub jwt: JwtConfig,
    pub storage: StorageBackend,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let storage = StorageBackend::from_env()?;
        let database = match storage {
            StorageBackend::Postgres => Some(PostgresConfig::from_env()?),
            StorageBackend::Memory => None,
        };
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            database,
            jwt,
            storage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "config-test-secret-with-32-characters!";

    #[test]
    fn test_memory_backend_needs_no_database() {
        temp_env::with_vars(
            [
                ("STORAGE_BACKEND", Some("memory")),
                ("DATABASE_URL", None),
                ("JWT_SECRET", Some(SECRET)),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.storage, StorageBackend::Memory);
                assert!(config.database.is_none());
                assert_eq!(config.app.name, "accounts_api");
            },
        );
    }

    #[test]
    fn test_postgres_is_default_and_requires_url() {
        temp_env::with_vars(
            [
                ("STORAGE_BACKEND", None),
                ("DATABASE_URL", None),
                ("JWT_SECRET", Some(SECRET)),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );

        temp_env::with_vars(
            [
                ("STORAGE_BACKEND", None),
                ("DATABASE_URL", Some("postgres://u:p@localhost/accounts")),
                ("JWT_SECRET", Some(SECRET)),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.storage, StorageBackend::Postgres);
                assert!(config.database.is_some());
            },
        );
    }

    #[test]
    fn test_missing_jwt_secret_fails() {
        temp_env::with_vars(
            [("STORAGE_BACKEND", Some("memory")), ("JWT_SECRET", None)],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        temp_env::with_var("STORAGE_BACKEND", Some("redis"), || {
            let err = StorageBackend::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { ref key, .. } if key == "STORAGE_BACKEND"));
        });
    }
}
