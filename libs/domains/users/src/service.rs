use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::{Arc, LazyLock};

use crate::addresses::repository::AddressRepository;
use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User, UserResponse};
use crate::repository::UserRepository;

/// Verified against when the email is unknown, so both login failures cost one argon2 run.
static DUMMY_PASSWORD_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("dummy-password-for-unknown-emails").ok());

/// Service layer for User business logic
pub struct UserService<U: UserRepository, A: AddressRepository> {
    users: Arc<U>,
    addresses: Arc<A>,
}

impl<U: UserRepository, A: AddressRepository> Clone for UserService<U, A> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            addresses: Arc::clone(&self.addresses),
        }
    }
}

impl<U: UserRepository, A: AddressRepository> UserService<U, A> {
    pub fn new(users: Arc<U>, addresses: Arc<A>) -> Self {
        Self { users, addresses }
    }

    /// Register a user with a hashed password. The user and any initial
    /// addresses are stored together or not at all.
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        if self.users.email_exists(&input.email).await? {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let password_hash = hash_password(&input.password)?;
        let (new_user, initial_addresses) = input.into_parts(password_hash);
        let (user, addresses) = self
            .users
            .create_with_addresses(new_user, initial_addresses)
            .await?;

        tracing::debug!(user_id = user.id, addresses = addresses.len(), "Registered user");
        Ok(user.into_response(addresses))
    }

    pub async fn get_user(&self, id: i64) -> UserResult<UserResponse> {
        let user = self
            .users
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let addresses = self.addresses.list_by_user(id).await?;
        Ok(user.into_response(addresses))
    }

    /// Update profile fields; a new password is re-hashed.
    pub async fn update_user(&self, id: i64, input: UpdateUser) -> UserResult<UserResponse> {
        let mut user = self
            .users
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if let Some(new_email) = input.email.as_deref() {
            if new_email != user.email && self.users.email_exists(new_email).await? {
                return Err(UserError::DuplicateEmail(new_email.to_string()));
            }
        }

        let new_password_hash = input.password.as_deref().map(hash_password).transpose()?;
        user.apply_update(input, new_password_hash);

        let updated = self.users.update(user).await?;
        let addresses = self.addresses.list_by_user(id).await?;
        Ok(updated.into_response(addresses))
    }

    /// Delete a user; their addresses go with them.
    pub async fn delete_user(&self, id: i64) -> UserResult<()> {
        if !self.users.delete(id).await? {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }

    /// Resolve login credentials. Unknown email and wrong password both yield
    /// `InvalidCredentials`.
    pub async fn authenticate(&self, email: &str, password: &str) -> UserResult<User> {
        let Some(user) = self.users.get_by_email(email).await? else {
            if let Some(dummy) = DUMMY_PASSWORD_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            tracing::debug!("Login attempt for unknown email");
            return Err(UserError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Login attempt with wrong password");
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }
}

/// Argon2id with a random salt, encoded as a PHC string.
pub fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addresses::models::{Address, AddressDto};
    use crate::addresses::repository::MockAddressRepository;
    use crate::models::NewUser;
    use crate::repository::MockUserRepository;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn stored_user(id: i64, email: &str, password: &str) -> User {
        let now = Utc::now();
        User {
            id,
            name: "A".to_string(),
            email: email.to_string(),
            password_hash: hash_password(password).unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    fn service(users: MockUserRepository, addresses: MockAddressRepository) -> UserService<MockUserRepository, MockAddressRepository> {
        UserService::new(Arc::new(users), Arc::new(addresses))
    }

    #[test]
    fn test_hash_is_salted_and_verifiable() {
        let first = hash_password("p").unwrap();
        let second = hash_password("p").unwrap();

        assert_ne!(first, second);
        assert_ne!(first, "p");
        assert!(verify_password("p", &first).unwrap());
        assert!(!verify_password("q", &first).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("p", "plaintext"),
            Err(UserError::PasswordHash(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut users = MockUserRepository::new();
        let user = stored_user(1, "a@x.com", "secret");
        users
            .expect_get_by_email()
            .with(eq("a@x.com"))
            .returning(move |_| Ok(Some(user.clone())));

        let svc = service(users, MockAddressRepository::new());
        let found = svc.authenticate("a@x.com", "secret").await.unwrap();
        assert_eq!(found.id, 1);
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let mut users = MockUserRepository::new();
        let user = stored_user(1, "a@x.com", "secret");
        users
            .expect_get_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let svc = service(users, MockAddressRepository::new());
        let result = svc.authenticate("a@x.com", "wrong").await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email() {
        let mut users = MockUserRepository::new();
        users.expect_get_by_email().returning(|_| Ok(None));

        let svc = service(users, MockAddressRepository::new());
        let result = svc.authenticate("nobody@x.com", "secret").await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[test]
    fn test_dummy_hash_is_verifiable() {
        let dummy = DUMMY_PASSWORD_HASH.as_deref().unwrap();
        assert!(!verify_password("secret", dummy).unwrap());
    }

    #[tokio::test]
    async fn test_unknown_email_still_runs_password_verification() {
        let mut users = MockUserRepository::new();
        users.expect_get_by_email().returning(|_| Ok(None));
        let svc = service(users, MockAddressRepository::new());

        // Warm the dummy hash so only the verification is timed
        let _ = DUMMY_PASSWORD_HASH.as_deref();

        let started = std::time::Instant::now();
        let result = svc.authenticate("nobody@x.com", "secret").await;
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(UserError::InvalidCredentials)));
        // A single argon2 verification with the default 19 MiB cost never finishes this fast
        assert!(
            elapsed >= std::time::Duration::from_millis(1),
            "unknown email returned in {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn test_create_user_hashes_password_and_binds_addresses() {
        let mut users = MockUserRepository::new();
        users.expect_email_exists().returning(|_| Ok(false));
        users
            .expect_create_with_addresses()
            .withf(|input: &NewUser, dtos: &Vec<AddressDto>| {
                input.password_hash != "p"
                    && verify_password("p", &input.password_hash).unwrap()
                    && dtos.len() == 1
            })
            .times(1)
            .returning(|input, dtos| {
                let now = Utc::now();
                let user = User {
                    id: 10,
                    name: input.name,
                    email: input.email,
                    password_hash: input.password_hash,
                    created_at: now,
                    updated_at: now,
                };
                let addresses = dtos
                    .into_iter()
                    .enumerate()
                    .map(|(i, dto)| {
                        let new = dto.into_new_address(user.id);
                        Address {
                            id: i as i64 + 1,
                            user_id: new.user_id,
                            street: new.street,
                            city: new.city,
                            country: new.country,
                            postal_code: new.postal_code,
                            created_at: now,
                            updated_at: now,
                        }
                    })
                    .collect();
                Ok((user, addresses))
            });

        let mut addresses = MockAddressRepository::new();
        addresses.expect_create().never();

        let svc = service(users, addresses);
        let created = svc
            .create_user(CreateUser {
                name: "A".into(),
                email: "a@x.com".into(),
                password: "p".into(),
                addresses: vec![AddressDto {
                    street: "s".into(),
                    city: "c".into(),
                    country: "k".into(),
                    postal_code: "p".into(),
                    user_id: Some(77),
                }],
            })
            .await
            .unwrap();

        assert_eq!(created.id, 10);
        assert_eq!(created.addresses.len(), 1);
        assert_eq!(created.addresses[0].street, "s");
    }

    #[tokio::test]
    async fn test_create_user_failure_while_storing_addresses_is_returned() {
        let mut users = MockUserRepository::new();
        users.expect_email_exists().returning(|_| Ok(false));
        users
            .expect_create_with_addresses()
            .times(1)
            .returning(|_, _| Err(UserError::Database(sea_orm::DbErr::Custom("insert failed".into()))));
        users.expect_create().never();

        let mut addresses = MockAddressRepository::new();
        addresses.expect_create().never();

        let svc = service(users, addresses);
        let result = svc
            .create_user(CreateUser {
                name: "A".into(),
                email: "a@x.com".into(),
                password: "p".into(),
                addresses: vec![
                    AddressDto {
                        street: "1".into(),
                        city: "c".into(),
                        country: "k".into(),
                        postal_code: "p".into(),
                        user_id: None,
                    },
                    AddressDto {
                        street: "2".into(),
                        city: "c".into(),
                        country: "k".into(),
                        postal_code: "p".into(),
                        user_id: None,
                    },
                ],
            })
            .await;

        assert!(matches!(result, Err(UserError::Database(_))));
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_email_exists()
            .with(eq("a@x.com"))
            .returning(|_| Ok(true));
        users.expect_create().never();

        let svc = service(users, MockAddressRepository::new());
        let result = svc
            .create_user(CreateUser {
                name: "A".into(),
                email: "a@x.com".into(),
                password: "p".into(),
                addresses: vec![],
            })
            .await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_get_by_id().with(eq(5)).returning(|_| Ok(None));

        let svc = service(users, MockAddressRepository::new());
        assert!(matches!(svc.get_user(5).await, Err(UserError::NotFound(5))));
    }

    #[tokio::test]
    async fn test_update_user_rejects_taken_email() {
        let mut users = MockUserRepository::new();
        let user = stored_user(1, "a@x.com", "p");
        users
            .expect_get_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_email_exists()
            .with(eq("b@x.com"))
            .returning(|_| Ok(true));
        users.expect_update().never();

        let svc = service(users, MockAddressRepository::new());
        let result = svc
            .update_user(
                1,
                UpdateUser {
                    email: Some("b@x.com".into()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_update_user_rehashes_password() {
        let mut users = MockUserRepository::new();
        let user = stored_user(1, "a@x.com", "old");
        users
            .expect_get_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_update()
            .withf(|u: &User| verify_password("new", &u.password_hash).unwrap())
            .returning(|u| Ok(u));

        let mut addresses = MockAddressRepository::new();
        addresses.expect_list_by_user().returning(|_| Ok(vec![]));

        let svc = service(users, addresses);
        let updated = svc
            .update_user(
                1,
                UpdateUser {
                    password: Some("new".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_delete().with(eq(3)).returning(|_| Ok(false));

        let svc = service(users, MockAddressRepository::new());
        assert!(matches!(svc.delete_user(3).await, Err(UserError::NotFound(3))));
    }
}
