use crate::entity::item_category;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

#[tracing::instrument(skip(db))]
pub async fn save_all<C: ConnectionTrait>(
    db: &C,
    item_id: i32,
    category_ids: &[i32],
) -> Result<(), DbErr> {
    for category_id in category_ids {
        let link = item_category::ActiveModel {
            item_id: Set(item_id),
            category_id: Set(*category_id),
        };
        link.insert(db).await?;
    }
    Ok(())
}

#[tracing::instrument(skip(db))]
pub async fn find_category_ids<C: ConnectionTrait>(db: &C, item_id: i32) -> Result<Vec<i32>, DbErr> {
    item_category::Entity::find()
        .select_only()
        .column(item_category::Column::CategoryId)
        .filter(item_category::Column::ItemId.eq(item_id))
        .order_by_asc(item_category::Column::CategoryId)
        .into_tuple()
        .all(db)
        .await
}

#[tracing::instrument(skip(db))]
pub async fn delete_by_item_id<C: ConnectionTrait>(db: &C, item_id: i32) -> Result<u64, DbErr> {
    Ok(item_category::Entity::delete_many()
        .filter(item_category::Column::ItemId.eq(item_id))
        .exec(db)
        .await?
        .rows_affected)
}

#[tracing::instrument(skip(db))]
pub async fn delete_by_category_id<C: ConnectionTrait>(
    db: &C,
    category_id: i32,
) -> Result<u64, DbErr> {
    Ok(item_category::Entity::delete_many()
        .filter(item_category::Column::CategoryId.eq(category_id))
        .exec(db)
        .await?
        .rows_affected)
}
