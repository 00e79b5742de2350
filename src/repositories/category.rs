use crate::entity::category;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel, QueryOrder, Set,
};

#[tracing::instrument(skip(db))]
pub async fn save<C: ConnectionTrait>(
    db: &C,
    name: &str,
    slug: &str,
    icon: &str,
) -> Result<category::Model, DbErr> {
    let new_category = category::ActiveModel {
        name: Set(name.to_string()),
        slug: Set(slug.to_string()),
        icon: Set(icon.to_string()),
        ..Default::default()
    };
    new_category.insert(db).await
}

#[tracing::instrument(skip_all)]
pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<category::Model>, DbErr> {
    category::Entity::find()
        .order_by_asc(category::Column::Id)
        .all(db)
        .await
}

#[tracing::instrument(skip(db))]
pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<Option<category::Model>, DbErr> {
    category::Entity::find_by_id(id).one(db).await
}

/// Writes only the fields that are `Some`.
#[tracing::instrument(skip(db, existing))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    existing: category::Model,
    name: Option<&str>,
    slug: Option<&str>,
    icon: Option<&str>,
) -> Result<category::Model, DbErr> {
    let mut model = existing.into_active_model();
    if let Some(name) = name {
        model.name = Set(name.to_string());
    }
    if let Some(slug) = slug {
        model.slug = Set(slug.to_string());
    }
    if let Some(icon) = icon {
        model.icon = Set(icon.to_string());
    }
    model.update(db).await
}

#[tracing::instrument(skip(db))]
pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<u64, DbErr> {
    Ok(category::Entity::delete_by_id(id).exec(db).await?.rows_affected)
}
