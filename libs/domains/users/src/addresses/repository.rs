use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use super::error::AddressResult;
use super::models::{Address, AddressDto, NewAddress};

/// Persistence for addresses. Ownership is checked by the service, not here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Insert an address, returning it with its store-assigned id
    async fn create(&self, input: NewAddress) -> AddressResult<Address>;

    async fn get_by_id(&self, id: i64) -> AddressResult<Option<Address>>;

    async fn list_by_user(&self, user_id: i64) -> AddressResult<Vec<Address>>;

    /// Replace the user-settable fields; `None` when the address does not exist
    async fn update(&self, id: i64, changes: AddressDto) -> AddressResult<Option<Address>>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: i64) -> AddressResult<bool>;

    /// True only when `id` exists and is owned by `user_id`
    async fn exists_for_user(&self, id: i64, user_id: i64) -> AddressResult<bool>;
}

/// In-memory implementation for local runs and tests
#[derive(Clone, Default)]
pub struct InMemoryAddressRepository {
    addresses: Arc<RwLock<HashMap<i64, Address>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryAddressRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `inputs` under a single write lock.
    pub(crate) async fn insert_all(&self, inputs: Vec<NewAddress>) -> Vec<Address> {
        let mut addresses = self.addresses.write().await;
        let now = chrono::Utc::now();

        inputs
            .into_iter()
            .map(|input| {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                let address = Address {
                    id,
                    user_id: input.user_id,
                    street: input.street,
                    city: input.city,
                    country: input.country,
                    postal_code: input.postal_code,
                    created_at: now,
                    updated_at: now,
                };
                addresses.insert(id, address.clone());
                address
            })
            .collect()
    }

    /// Removes every address owned by `user_id`, mirroring the FK cascade.
    pub async fn delete_by_user(&self, user_id: i64) -> usize {
        let mut addresses = self.addresses.write().await;
        let before = addresses.len();
        addresses.retain(|_, a| a.user_id != user_id);
        let removed = before - addresses.len();

        if removed > 0 {
            tracing::info!(user_id, removed, "Cascaded address delete");
        }
        removed
    }
}

#[async_trait]
impl AddressRepository for InMemoryAddressRepository {
    async fn create(&self, input: NewAddress) -> AddressResult<Address> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = chrono::Utc::now();
        let address = Address {
            id,
            user_id: input.user_id,
            street: input.street,
            city: input.city,
            country: input.country,
            postal_code: input.postal_code,
            created_at: now,
            updated_at: now,
        };

        self.addresses.write().await.insert(id, address.clone());
        tracing::info!(address_id = id, user_id = address.user_id, "Created address");
        Ok(address)
    }

    async fn get_by_id(&self, id: i64) -> AddressResult<Option<Address>> {
        Ok(self.addresses.read().await.get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: i64) -> AddressResult<Vec<Address>> {
        let addresses = self.addresses.read().await;
        let mut owned: Vec<Address> = addresses
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by_key(|a| a.id);
        Ok(owned)
    }

    async fn update(&self, id: i64, changes: AddressDto) -> AddressResult<Option<Address>> {
        let mut addresses = self.addresses.write().await;
        let Some(address) = addresses.get_mut(&id) else {
            return Ok(None);
        };

        address.apply_update(changes);
        tracing::info!(address_id = id, "Updated address");
        Ok(Some(address.clone()))
    }

    async fn delete(&self, id: i64) -> AddressResult<bool> {
        let removed = self.addresses.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(address_id = id, "Deleted address");
        }
        Ok(removed)
    }

    async fn exists_for_user(&self, id: i64, user_id: i64) -> AddressResult<bool> {
        Ok(self
            .addresses
            .read()
            .await
            .get(&id)
            .is_some_and(|a| a.user_id == user_id))
    }
}
