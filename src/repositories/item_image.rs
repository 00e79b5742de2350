use crate::entity::item_image;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

#[tracing::instrument(skip(db))]
pub async fn save_all<C: ConnectionTrait>(
    db: &C,
    item_id: i32,
    links: &[String],
) -> Result<Vec<item_image::Model>, DbErr> {
    let mut saved = Vec::with_capacity(links.len());
    for link in links {
        let image = item_image::ActiveModel {
            item_id: Set(item_id),
            image_link: Set(link.clone()),
            ..Default::default()
        };
        saved.push(image.insert(db).await?);
    }
    Ok(saved)
}

#[tracing::instrument(skip(db))]
pub async fn find_by_item_id<C: ConnectionTrait>(
    db: &C,
    item_id: i32,
) -> Result<Vec<item_image::Model>, DbErr> {
    item_image::Entity::find()
        .filter(item_image::Column::ItemId.eq(item_id))
        .order_by_asc(item_image::Column::Id)
        .all(db)
        .await
}

#[tracing::instrument(skip(db))]
pub async fn delete_by_item_id<C: ConnectionTrait>(db: &C, item_id: i32) -> Result<u64, DbErr> {
    Ok(item_image::Entity::delete_many()
        .filter(item_image::Column::ItemId.eq(item_id))
        .exec(db)
        .await?
        .rows_affected)
}
