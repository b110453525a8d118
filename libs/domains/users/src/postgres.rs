use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, SqlErr,
    TransactionTrait,
};

use crate::{
    addresses::{
        entity as address_entity,
        models::{Address, AddressDto},
    },
    entity,
    error::{UserError, UserResult},
    models::{NewUser, User},
    repository::UserRepository,
};

/// PostgreSQL implementation of UserRepository using SeaORM.
///
/// Address cleanup on delete is left to the `ON DELETE CASCADE` foreign key.
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Unique index violations on `users.email` become `DuplicateEmail`.
fn map_write_error(err: DbErr, email: &str) -> UserError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => UserError::DuplicateEmail(email.to_string()),
        _ => UserError::Database(err),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, input: NewUser) -> UserResult<User> {
        let email = input.email.clone();
        let active_model: entity::ActiveModel = input.into();

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_error(e, &email))?;

        tracing::info!(user_id = model.id, "Created user");
        Ok(model.into())
    }

    async fn create_with_addresses(
        &self,
        input: NewUser,
        addresses: Vec<AddressDto>,
    ) -> UserResult<(User, Vec<Address>)> {
        let email = input.email.clone();
        // Dropping the transaction on an early return rolls it back
        let txn = self.db.begin().await?;

        let user: User = entity::ActiveModel::from(input)
            .insert(&txn)
            .await
            .map_err(|e| map_write_error(e, &email))?
            .into();

        let mut stored = Vec::with_capacity(addresses.len());
        for dto in addresses {
            let model = address_entity::ActiveModel::from(dto.into_new_address(user.id))
                .insert(&txn)
                .await?;
            stored.push(model.into());
        }

        txn.commit().await?;

        tracing::info!(user_id = user.id, addresses = stored.len(), "Created user with addresses");
        Ok((user, stored))
    }

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let id = user.id;
        let email = user.email.clone();
        let active_model: entity::ActiveModel = user.into();

        let model = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => UserError::NotFound(id),
            other => map_write_error(other, &email),
        })?;

        tracing::info!(user_id = id, "Updated user");
        Ok(model.into())
    }

    async fn delete(&self, id: i64) -> UserResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(user_id = id, "Deleted user");
        }
        Ok(result.rows_affected > 0)
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        Ok(self.get_by_email(email).await?.is_some())
    }
}
