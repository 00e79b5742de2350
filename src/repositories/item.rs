use crate::entity::item;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, Set};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFields {
    pub name: String,
    pub description: String,
    pub unit: String,
    pub slug: String,
}

#[tracing::instrument(skip(db))]
pub async fn save<C: ConnectionTrait>(db: &C, fields: ItemFields) -> Result<item::Model, DbErr> {
    let new_item = item::ActiveModel {
        name: Set(fields.name),
        description: Set(fields.description),
        unit: Set(fields.unit),
        slug: Set(fields.slug),
        ..Default::default()
    };
    new_item.insert(db).await
}

#[tracing::instrument(skip(db))]
pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<item::Model>, DbErr> {
    item::Entity::find_by_id(id).one(db).await
}

#[tracing::instrument(skip(db))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i32,
    fields: ItemFields,
) -> Result<item::Model, DbErr> {
    let model = item::ActiveModel {
        id: Set(id),
        name: Set(fields.name),
        description: Set(fields.description),
        unit: Set(fields.unit),
        slug: Set(fields.slug),
    };
    model.update(db).await
}

#[tracing::instrument(skip(db))]
pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<u64, DbErr> {
    Ok(item::Entity::delete_by_id(id).exec(db).await?.rows_affected)
}
