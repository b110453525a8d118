use std::sync::Arc;

use super::error::{AddressError, AddressResult};
use super::models::{Address, AddressDto};
use super::repository::AddressRepository;
use crate::repository::UserRepository;

/// Address operations, every one scoped to the calling user.
pub struct AddressService<A: AddressRepository, U: UserRepository> {
    addresses: Arc<A>,
    users: Arc<U>,
}

impl<A: AddressRepository, U: UserRepository> Clone for AddressService<A, U> {
    fn clone(&self) -> Self {
        Self {
            addresses: Arc::clone(&self.addresses),
            users: Arc::clone(&self.users),
        }
    }
}

impl<A: AddressRepository, U: UserRepository> AddressService<A, U> {
    pub fn new(addresses: Arc<A>, users: Arc<U>) -> Self {
        Self { addresses, users }
    }

    async fn ensure_owner_exists(&self, caller_id: i64) -> AddressResult<()> {
        match self.users.get_by_id(caller_id).await? {
            Some(_) => Ok(()),
            None => Err(AddressError::OwnerNotFound(caller_id)),
        }
    }

    /// Persist a new address owned by the caller. Any `user_id` in `dto` is ignored.
    pub async fn create_address(&self, caller_id: i64, dto: AddressDto) -> AddressResult<Address> {
        self.ensure_owner_exists(caller_id).await?;

        if dto.user_id.is_some_and(|id| id != caller_id) {
            tracing::debug!(caller_id, "Ignoring client supplied address owner");
        }

        self.addresses.create(dto.into_new_address(caller_id)).await
    }

    pub async fn list_mine(&self, caller_id: i64) -> AddressResult<Vec<Address>> {
        self.ensure_owner_exists(caller_id).await?;
        self.addresses.list_by_user(caller_id).await
    }

    pub async fn get_address(&self, id: i64, caller_id: i64) -> AddressResult<Address> {
        self.addresses
            .get_by_id(id)
            .await?
            .filter(|a| a.user_id == caller_id)
            .ok_or(AddressError::NotFound(id))
    }

    /// Applies `dto` only after the store confirms `id` belongs to the caller.
    pub async fn update_address(
        &self,
        id: i64,
        caller_id: i64,
        dto: AddressDto,
    ) -> AddressResult<Address> {
        if !self.addresses.exists_for_user(id, caller_id).await? {
            tracing::info!(address_id = id, caller_id, "Address update denied");
            return Err(AddressError::NotFoundForUpdate(id));
        }

        self.addresses
            .update(id, dto)
            .await?
            .ok_or(AddressError::NotFoundForUpdate(id))
    }

    pub async fn delete_address(&self, id: i64, caller_id: i64) -> AddressResult<()> {
        let owned = self
            .addresses
            .get_by_id(id)
            .await?
            .is_some_and(|a| a.user_id == caller_id);

        if !owned {
            tracing::info!(address_id = id, caller_id, "Address delete denied");
            return Err(AddressError::NotFound(id));
        }

        if !self.addresses.delete(id).await? {
            return Err(AddressError::NotFound(id));
        }
        Ok(())
    }
}
