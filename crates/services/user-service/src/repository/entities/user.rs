//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};

use domain::User;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub email: String,
    pub password: String,
    pub role: String,
    pub name: String,
    pub last_login: Option<DateTimeUtc>,
    pub gateway_customer_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            email: model.email,
            password: model.password,
            role: model.role,
            name: model.name,
            last_login: model.last_login,
            gateway_customer_id: model.gateway_customer_id,
        }
    }
}

impl ActiveModel {
    /// Active model for inserting `user`; the id is left to the database.
    pub fn for_insert(user: User) -> Self {
        Self {
            id: NotSet,
            email: Set(user.email),
            password: Set(user.password),
            role: Set(user.role),
            name: Set(user.name),
            last_login: Set(user.last_login),
            gateway_customer_id: Set(user.gateway_customer_id),
        }
    }

    /// Active model that overwrites every column of the row `user.id`.
    pub fn for_update(user: User) -> Self {
        Self {
            id: Unchanged(user.id),
            email: Set(user.email),
            password: Set(user.password),
            role: Set(user.role),
            name: Set(user.name),
            last_login: Set(user.last_login),
            gateway_customer_id: Set(user.gateway_customer_id),
        }
    }
}
