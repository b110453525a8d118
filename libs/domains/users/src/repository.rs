use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::addresses::error::AddressError;
use crate::addresses::models::{Address, AddressDto};
use crate::addresses::repository::InMemoryAddressRepository;
use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; `DuplicateEmail` when the email is taken
    async fn create(&self, input: NewUser) -> UserResult<User>;

    /// Insert a user and their initial addresses as one unit. On error
    /// neither the user nor any address is kept.
    async fn create_with_addresses(
        &self,
        input: NewUser,
        addresses: Vec<AddressDto>,
    ) -> UserResult<(User, Vec<Address>)>;

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>>;

    /// Exact-match lookup
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Persist a modified user; `NotFound` when it no longer exists
    async fn update(&self, user: User) -> UserResult<User>;

    /// Delete a user and, by cascade, their addresses. False when nothing was deleted.
    async fn delete(&self, id: i64) -> UserResult<bool>;

    async fn email_exists(&self, email: &str) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<i64, User>>>,
    next_id: Arc<AtomicI64>,
    addresses: Option<InMemoryAddressRepository>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deleting a user also removes their addresses from `addresses`.
    pub fn with_addresses(addresses: InMemoryAddressRepository) -> Self {
        Self {
            addresses: Some(addresses),
            ..Self::default()
        }
    }

    fn insert_locked(&self, users: &mut HashMap<i64, User>, input: NewUser) -> UserResult<User> {
        if users.values().any(|u| u.email == input.email) {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = chrono::Utc::now();
        let user = User {
            id,
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.insert(id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, input: NewUser) -> UserResult<User> {
        let mut users = self.users.write().await;
        let user = self.insert_locked(&mut users, input)?;

        tracing::info!(user_id = user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn create_with_addresses(
        &self,
        input: NewUser,
        addresses: Vec<AddressDto>,
    ) -> UserResult<(User, Vec<Address>)> {
        let mut users = self.users.write().await;

        let store = match &self.addresses {
            Some(store) => Some(store),
            None if addresses.is_empty() => None,
            None => {
                return Err(AddressError::Internal("no address store attached".to_string()).into());
            }
        };

        let user = self.insert_locked(&mut users, input)?;
        let stored = match store {
            Some(store) => {
                store
                    .insert_all(
                        addresses
                            .into_iter()
                            .map(|dto| dto.into_new_address(user.id))
                            .collect(),
                    )
                    .await
            }
            None => Vec::new(),
        };

        tracing::info!(user_id = user.id, addresses = stored.len(), "Created user with addresses");
        Ok((user, stored))
    }

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }
        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());
        tracing::info!(user_id = user.id, "Updated user");
        Ok(user)
    }

    async fn delete(&self, id: i64) -> UserResult<bool> {
        let removed = self.users.write().await.remove(&id).is_some();

        if removed {
            if let Some(addresses) = &self.addresses {
                addresses.delete_by_user(id).await;
            }
            tracing::info!(user_id = id, "Deleted user");
        }

        Ok(removed)
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        Ok(self.users.read().await.values().any(|u| u.email == email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addresses::models::NewAddress;
    use crate::addresses::repository::AddressRepository;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn address_dto(street: &str) -> AddressDto {
        AddressDto {
            street: street.into(),
            city: "c".into(),
            country: "k".into(),
            postal_code: "p".into(),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_ids() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create(new_user("a@x.com")).await.unwrap();
        let second = repo.create(new_user("b@x.com")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.get_by_id(2).await.unwrap().unwrap().email, "b@x.com");
    }

    #[tokio::test]
    async fn test_get_by_email_is_exact() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("a@x.com")).await.unwrap();

        assert!(repo.get_by_email("a@x.com").await.unwrap().is_some());
        assert!(repo.get_by_email("A@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_error() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("a@x.com")).await.unwrap();

        let result = repo.create(new_user("a@x.com")).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_create_with_addresses_stores_both() {
        let addresses = InMemoryAddressRepository::new();
        let repo = InMemoryUserRepository::with_addresses(addresses.clone());

        let (user, stored) = repo
            .create_with_addresses(new_user("a@x.com"), vec![address_dto("1"), address_dto("2")])
            .await
            .unwrap();

        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|a| a.user_id == user.id));
        assert_eq!(addresses.list_by_user(user.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_with_addresses_keeps_nothing_on_failure() {
        let repo = InMemoryUserRepository::new();

        let result = repo
            .create_with_addresses(new_user("a@x.com"), vec![address_dto("1"), address_dto("2")])
            .await;

        assert!(matches!(
            result,
            Err(UserError::Address(AddressError::Internal(_)))
        ));
        assert!(repo.get_by_email("a@x.com").await.unwrap().is_none());
        assert!(repo.create(new_user("a@x.com")).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_with_addresses_duplicate_email_writes_no_addresses() {
        let addresses = InMemoryAddressRepository::new();
        let repo = InMemoryUserRepository::with_addresses(addresses.clone());
        let existing = repo.create(new_user("a@x.com")).await.unwrap();

        let result = repo
            .create_with_addresses(new_user("a@x.com"), vec![address_dto("1")])
            .await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
        assert!(addresses.list_by_user(existing.id).await.unwrap().is_empty());
        assert!(addresses.list_by_user(existing.id + 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("a@x.com")).await.unwrap();
        let mut b = repo.create(new_user("b@x.com")).await.unwrap();

        b.email = "a@x.com".to_string();
        let result = repo.update(b).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = InMemoryUserRepository::new();
        let mut ghost = repo.create(new_user("a@x.com")).await.unwrap();
        ghost.id = 42;

        assert!(matches!(
            repo.update(ghost).await,
            Err(UserError::NotFound(42))
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_addresses() {
        let addresses = InMemoryAddressRepository::new();
        let repo = InMemoryUserRepository::with_addresses(addresses.clone());
        let owner = repo.create(new_user("a@x.com")).await.unwrap();
        let other = repo.create(new_user("b@x.com")).await.unwrap();

        for user_id in [owner.id, owner.id, other.id] {
            addresses
                .create(NewAddress {
                    user_id,
                    street: "s".into(),
                    city: "c".into(),
                    country: "k".into(),
                    postal_code: "p".into(),
                })
                .await
                .unwrap();
        }

        assert!(repo.delete(owner.id).await.unwrap());
        assert!(addresses.list_by_user(owner.id).await.unwrap().is_empty());
        assert_eq!(addresses.list_by_user(other.id).await.unwrap().len(), 1);
        assert!(!repo.delete(owner.id).await.unwrap());
    }
}
