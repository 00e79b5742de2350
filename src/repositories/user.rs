use crate::entity::user::{self, Role};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};

#[tracing::instrument(skip_all)]
pub async fn save<C: ConnectionTrait>(
    db: &C,
    name: &str,
    role: &str,
    secret_hash: String,
) -> Result<user::Model, DbErr> {
    let new_user = user::ActiveModel {
        name: Set(name.to_string()),
        role: Set(role.to_string()),
        secret: Set(secret_hash),
        ..Default::default()
    };
    new_user.insert(db).await
}

#[tracing::instrument(skip_all)]
pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find_by_id(id).one(db).await
}

#[tracing::instrument(skip(db))]
pub async fn find_by_name_and_role<C: ConnectionTrait>(
    db: &C,
    name: &str,
    role: Role,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Name.eq(name))
        .filter(user::Column::Role.eq(role.as_str()))
        .one(db)
        .await
}

#[tracing::instrument(skip(db))]
pub async fn exist_by_name<C: ConnectionTrait>(db: &C, name: &str) -> Result<bool, DbErr> {
    Ok(user::Entity::find()
        .filter(user::Column::Name.eq(name))
        .one(db)
        .await?
        .is_some())
}
