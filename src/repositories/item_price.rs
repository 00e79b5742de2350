use crate::{dto::request::PriceEntry, entity::item_price};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

#[tracing::instrument(skip(db))]
pub async fn save<C: ConnectionTrait>(
    db: &C,
    item_id: i32,
    entry: &PriceEntry,
) -> Result<item_price::Model, DbErr> {
    let price = item_price::ActiveModel {
        item_id: Set(item_id),
        min_price: Set(entry.min_price),
        max_price: Set(entry.max_price),
        division: Set(entry.division.clone()),
        date: Set(entry.date),
        ..Default::default()
    };
    price.insert(db).await
}

#[tracing::instrument(skip(db))]
pub async fn find_by_item_id<C: ConnectionTrait>(
    db: &C,
    item_id: i32,
) -> Result<Vec<item_price::Model>, DbErr> {
    item_price::Entity::find()
        .filter(item_price::Column::ItemId.eq(item_id))
        .order_by_asc(item_price::Column::Date)
        .order_by_asc(item_price::Column::Id)
        .all(db)
        .await
}

/// Removes every price of `item_id` in `division` that falls on the same
/// UTC calendar day as `date`.
#[tracing::instrument(skip(db))]
pub async fn delete_on_day<C: ConnectionTrait>(
    db: &C,
    item_id: i32,
    division: &str,
    date: DateTime<Utc>,
) -> Result<u64, DbErr> {
    let (start, end) = day_bounds(date);
    Ok(item_price::Entity::delete_many()
        .filter(item_price::Column::ItemId.eq(item_id))
        .filter(item_price::Column::Division.eq(division))
        .filter(item_price::Column::Date.gte(start))
        .filter(item_price::Column::Date.lt(end))
        .exec(db)
        .await?
        .rows_affected)
}

#[tracing::instrument(skip(db))]
pub async fn delete_by_item_id<C: ConnectionTrait>(db: &C, item_id: i32) -> Result<u64, DbErr> {
    Ok(item_price::Entity::delete_many()
        .filter(item_price::Column::ItemId.eq(item_id))
        .exec(db)
        .await?
        .rows_affected)
}

pub fn day_bounds(date: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(date);
    (start, start + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_bounds_cover_the_whole_utc_day() {
        let (start, end) = day_bounds(Utc.with_ymd_and_hms(2024, 1, 1, 17, 45, 3).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
    }
}
