use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use super::models::{Address, NewAddress};

/// Sea-ORM Entity for the addresses table
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "addresses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub street: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::entity::Entity",
        from = "Column::UserId",
        to = "crate::entity::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<crate::entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub const TAG: &'static str = "addresses";
}

impl From<Model> for Address {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            street: model.street,
            city: model.city,
            country: model.country,
            postal_code: model.postal_code,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<NewAddress> for ActiveModel {
    fn from(input: NewAddress) -> Self {
        let now = chrono::Utc::now();
        ActiveModel {
            id: NotSet,
            user_id: Set(input.user_id),
            street: Set(input.street),
            city: Set(input.city),
            country: Set(input.country),
            postal_code: Set(input.postal_code),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }
}
