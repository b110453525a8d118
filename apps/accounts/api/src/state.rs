//! Application state management.
//!
//! Holds the configuration, the storage backend selected at startup and the
//! JWT issuer/verifier shared by every router.

use axum_helpers::JwtAuth;
use database::postgres::DatabaseConnection;
use domain_users::{InMemoryAddressRepository, InMemoryUserRepository};
use std::sync::Arc;
use tracing::info;

/// Storage chosen by `STORAGE_BACKEND`
#[derive(Clone)]
pub enum Storage {
    /// PostgreSQL connection pool
    Postgres(DatabaseConnection),
    /// Process-local maps; user deletes cascade to the address map
    Memory {
        users: Arc<InMemoryUserRepository>,
        addresses: Arc<InMemoryAddressRepository>,
    },
}

impl Storage {
    pub fn in_memory() -> Self {
        let addresses = InMemoryAddressRepository::new();
        let users = InMemoryUserRepository::with_addresses(addresses.clone());

        Self::Memory {
            users: Arc::new(users),
            addresses: Arc::new(addresses),
        }
    }

    /// Readiness probe; the in-memory backend is always ready.
    pub async fn ping(&self) -> Result<(), String> {
        match self {
            Storage::Postgres(db) => database::postgres::check_health(db)
                .await
                .map_err(|e| e.to_string()),
            Storage::Memory { .. } => Ok(()),
        }
    }

    pub async fn close(self) {
        match self {
            Storage::Postgres(db) => match db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            },
            Storage::Memory { .. } => info!("In-memory storage dropped"),
        }
    }
}

/// Shared application state.
///
/// Cloned for each handler; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub storage: Storage,
    pub jwt_auth: JwtAuth,
}
