use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder,
};

use super::{
    entity,
    error::AddressResult,
    models::{Address, AddressDto, NewAddress},
    repository::AddressRepository,
};

#[derive(Clone)]
pub struct PgAddressRepository {
    db: DatabaseConnection,
}

impl PgAddressRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AddressRepository for PgAddressRepository {
    async fn create(&self, input: NewAddress) -> AddressResult<Address> {
        let active_model: entity::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await?;

        tracing::info!(address_id = model.id, user_id = model.user_id, "Created address");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> AddressResult<Option<Address>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list_by_user(&self, user_id: i64) -> AddressResult<Vec<Address>> {
        let models = entity::Entity::find()
            .filter(entity::Column::UserId.eq(user_id))
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i64, changes: AddressDto) -> AddressResult<Option<Address>> {
        let Some(model) = entity::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active_model = model.into_active_model();
        active_model.street = Set(changes.street);
        active_model.city = Set(changes.city);
        active_model.country = Set(changes.country);
        active_model.postal_code = Set(changes.postal_code);
        active_model.updated_at = Set(chrono::Utc::now().into());

        let updated = active_model.update(&self.db).await?;
        tracing::info!(address_id = id, "Updated address");
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: i64) -> AddressResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(address_id = id, "Deleted address");
        }
        Ok(result.rows_affected > 0)
    }

    async fn exists_for_user(&self, id: i64, user_id: i64) -> AddressResult<bool> {
        let found = entity::Entity::find_by_id(id)
            .filter(entity::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        Ok(found.is_some())
    }
}
