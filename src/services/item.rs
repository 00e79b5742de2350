use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::info;

use super::{required, store_files};
use crate::{
    dto::form::ItemForm,
    entity::{item, item_image, item_price},
    errors::{ApiError, ApiResult},
    repositories::{self, item::ItemFields},
    utils::storage::{Bucket, Storage},
};

/// An item together with everything it owns or links to.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDetail {
    pub item: item::Model,
    pub images: Vec<item_image::Model>,
    pub category_ids: Vec<i32>,
    pub prices: Vec<item_price::Model>,
}

pub async fn create(
    db: &DatabaseConnection,
    storage: &Storage,
    form: ItemForm,
) -> ApiResult<ItemDetail> {
    let fields = ItemFields {
        name: required(&form.name, "name")?.to_string(),
        description: required(&form.description, "description")?.to_string(),
        unit: required(&form.unit, "unit")?.to_string(),
        slug: required(&form.slug, "slug")?.to_string(),
    };
    let category_ids = form
        .category_ids
        .as_ref()
        .ok_or_else(|| ApiError::InvalidInput("category_ids is required".to_string()))?;
    if form.images.is_empty() {
        return Err(ApiError::InvalidInput(
            "at least one image is required".to_string(),
        ));
    }

    let links = store_files(storage, &form.images, Bucket::Items).await?;
    let transaction = db.begin().await?;
    let inserted = insert_item(
        transaction,
        fields,
        &links,
        category_ids.as_slice(),
        form.prices.as_deref().unwrap_or_default(),
    )
    .await;

    match inserted {
        Ok(detail) => {
            info!(
                id = detail.item.id,
                images = detail.images.len(),
                categories = detail.category_ids.len(),
                prices = detail.prices.len(),
                "Item created"
            );
            Ok(detail)
        }
        Err(e) => {
            storage.delete_all(&links).await;
            Err(e)
        }
    }
}

async fn insert_item(
    transaction: DatabaseTransaction,
    fields: ItemFields,
    links: &[String],
    category_ids: &[i32],
    prices: &[crate::dto::request::PriceEntry],
) -> ApiResult<ItemDetail> {
    let item = repositories::item::save(&transaction, fields).await?;
    let images = repositories::item_image::save_all(&transaction, item.id, links).await?;
    repositories::item_category::save_all(&transaction, item.id, category_ids).await?;

    let mut saved_prices = Vec::with_capacity(prices.len());
    for entry in prices {
        saved_prices.push(repositories::item_price::save(&transaction, item.id, entry).await?);
    }
    transaction.commit().await?;

    Ok(ItemDetail {
        item,
        images,
        category_ids: category_ids.to_vec(),
        prices: saved_prices,
    })
}

pub async fn get(db: &DatabaseConnection, id: i32) -> ApiResult<ItemDetail> {
    let item = repositories::item::find_by_id(db, id)
        .await?
        .ok_or(ApiError::NotFound("Item"))?;
    load_detail(db, item).await
}

async fn load_detail<C: ConnectionTrait>(db: &C, item: item::Model) -> ApiResult<ItemDetail> {
    let images = repositories::item_image::find_by_item_id(db, item.id).await?;
    let category_ids = repositories::item_category::find_category_ids(db, item.id).await?;
    let prices = repositories::item_price::find_by_item_id(db, item.id).await?;
    Ok(ItemDetail {
        item,
        images,
        category_ids,
        prices,
    })
}

/// Applies every supplied change in one transaction:
/// scalars fall back to their stored values, category links and images are
/// replaced wholesale, prices are upserted per (division, day).
pub async fn update(
    db: &DatabaseConnection,
    storage: &Storage,
    id: i32,
    form: ItemForm,
) -> ApiResult<()> {
    let transaction = db.begin().await?;
    let existing = repositories::item::find_by_id(&transaction, id)
        .await?
        .ok_or(ApiError::NotFound("Item"))?;

    let new_links = store_files(storage, &form.images, Bucket::Items).await?;

    match apply_update(transaction, existing, &form, &new_links).await {
        Ok(old_links) => {
            storage.delete_all(&old_links).await;
            info!(id, replaced_images = old_links.len(), "Item updated");
            Ok(())
        }
        Err(e) => {
            storage.delete_all(&new_links).await;
            Err(e)
        }
    }
}

/// Returns the image links that were replaced.
async fn apply_update(
    transaction: DatabaseTransaction,
    existing: item::Model,
    form: &ItemForm,
    new_links: &[String],
) -> ApiResult<Vec<String>> {
    let id = existing.id;
    let fields = ItemFields {
        name: form.name.clone().unwrap_or(existing.name),
        description: form.description.clone().unwrap_or(existing.description),
        unit: form.unit.clone().unwrap_or(existing.unit),
        slug: form.slug.clone().unwrap_or(existing.slug),
    };
    repositories::item::update(&transaction, id, fields).await?;

    if let Some(category_ids) = &form.category_ids {
        repositories::item_category::delete_by_item_id(&transaction, id).await?;
        repositories::item_category::save_all(&transaction, id, category_ids.as_slice()).await?;
    }

    if let Some(prices) = &form.prices {
        for entry in prices {
            repositories::item_price::delete_on_day(&transaction, id, &entry.division, entry.date)
                .await?;
            repositories::item_price::save(&transaction, id, entry).await?;
        }
    }

    let mut old_links = Vec::new();
    if !new_links.is_empty() {
        old_links = repositories::item_image::find_by_item_id(&transaction, id)
            .await?
            .into_iter()
            .map(|image| image.image_link)
            .collect();
        repositories::item_image::delete_by_item_id(&transaction, id).await?;
        repositories::item_image::save_all(&transaction, id, new_links).await?;
    }

    transaction.commit().await?;
    Ok(old_links)
}

/// Deletes the item with its images, prices and links, then the image files.
pub async fn delete(db: &DatabaseConnection, storage: &Storage, id: i32) -> ApiResult<()> {
    let transaction = db.begin().await?;
    repositories::item::find_by_id(&transaction, id)
        .await?
        .ok_or(ApiError::NotFound("Item"))?;

    let links: Vec<String> = repositories::item_image::find_by_item_id(&transaction, id)
        .await?
        .into_iter()
        .map(|image| image.image_link)
        .collect();
    repositories::item_image::delete_by_item_id(&transaction, id).await?;
    repositories::item_price::delete_by_item_id(&transaction, id).await?;
    repositories::item_category::delete_by_item_id(&transaction, id).await?;
    repositories::item::delete_by_id(&transaction, id).await?;
    transaction.commit().await?;

    storage.delete_all(&links).await;
    info!(id, images = links.len(), "Item deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::{
            form::{CategoryForm, UploadedFile},
            request::{CategoryIds, PriceEntry},
        },
        services::{
            self,
            test_support::{memory_db, temp_storage},
        },
    };
    use axum::body::Bytes;
    use chrono::{TimeZone, Utc};

    fn image(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            bytes: Bytes::from_static(b"jpeg"),
        }
    }

    async fn seed_categories(db: &DatabaseConnection, storage: &Storage, slugs: &[&str]) -> Vec<i32> {
        let mut ids = Vec::new();
        for slug in slugs {
            let created = services::category::create(
                db,
                storage,
                CategoryForm {
                    name: Some(slug.to_string()),
                    slug: Some(slug.to_string()),
                    icon: Some(image("icon.png")),
                },
            )
            .await
            .unwrap();
            ids.push(created.id);
        }
        ids
    }

    fn rice_form(category_ids: &str, price: &str) -> ItemForm {
        ItemForm {
            name: Some("Rice".to_string()),
            description: Some("Long grain".to_string()),
            unit: Some("kg".to_string()),
            slug: Some("rice".to_string()),
            category_ids: Some(CategoryIds::parse(category_ids).unwrap()),
            prices: Some(PriceEntry::parse_list(price).unwrap()),
            images: vec![image("rice.jpg")],
        }
    }

    const NORTH_JAN_1: &str =
        r#"[{"min_price":10,"max_price":20,"division":"north","date":"2024-01-01"}]"#;

    #[tokio::test]
    async fn create_links_images_categories_and_prices() {
        let db = memory_db().await;
        let (_dir, storage) = temp_storage();
        seed_categories(&db, &storage, &["grains", "staples"]).await;

        let created = create(&db, &storage, rice_form(r#"["1","2"]"#, NORTH_JAN_1))
            .await
            .unwrap();

        let detail = get(&db, created.item.id).await.unwrap();
        assert_eq!(detail, created);
        assert_eq!(detail.category_ids, vec![1, 2]);
        assert_eq!(detail.images.len(), 1);
        assert!(storage.resolve(&detail.images[0].image_link).unwrap().exists());
        assert_eq!(detail.prices.len(), 1);
        assert_eq!(detail.prices[0].division, "north");
        assert_eq!(
            detail.prices[0].date,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn create_rejects_missing_fields_and_empty_image_set() {
        let db = memory_db().await;
        let (dir, storage) = temp_storage();
        seed_categories(&db, &storage, &["grains"]).await;

        let no_images = ItemForm {
            images: Vec::new(),
            ..rice_form("[1]", "[]")
        };
        let no_categories = ItemForm {
            category_ids: None,
            ..rice_form("[1]", "[]")
        };
        let no_unit = ItemForm {
            unit: None,
            ..rice_form("[1]", "[]")
        };
        for form in [no_images, no_categories, no_unit] {
            let err = create(&db, &storage, form).await.unwrap_err();
            assert!(matches!(err, ApiError::InvalidInput(_)));
        }
        assert!(!dir.path().join("items").exists());
    }

    #[tokio::test]
    async fn failed_create_rolls_back_rows_and_files() {
        let db = memory_db().await;
        let (dir, storage) = temp_storage();

        // Category 99 does not exist, so the link insert fails
        let err = create(&db, &storage, rice_form("[99]", NORTH_JAN_1))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        assert!(matches!(get(&db, 1).await.unwrap_err(), ApiError::NotFound(_)));
        let leftover = std::fs::read_dir(dir.path().join("items")).unwrap().count();
        assert_eq!(leftover, 0);
    }

    #[tokio::test]
    async fn price_update_replaces_same_division_and_day() {
        let db = memory_db().await;
        let (_dir, storage) = temp_storage();
        seed_categories(&db, &storage, &["grains"]).await;
        let created = create(&db, &storage, rice_form("[1]", NORTH_JAN_1)).await.unwrap();
        let id = created.item.id;

        let form = ItemForm {
            prices: Some(
                PriceEntry::parse_list(
                    r#"[{"min_price":15,"max_price":20,"division":"north","date":"2024-01-01T09:30:00Z"},
                        {"min_price":7,"max_price":9,"division":"south","date":"2024-01-01"}]"#,
                )
                .unwrap(),
            ),
            ..ItemForm::default()
        };
        update(&db, &storage, id, form).await.unwrap();

        let detail = get(&db, id).await.unwrap();
        let north: Vec<_> = detail.prices.iter().filter(|p| p.division == "north").collect();
        assert_eq!(north.len(), 1);
        assert_eq!(north[0].min_price, 15.0);
        assert_eq!(detail.prices.len(), 2);
        // Scalars not supplied keep their values
        assert_eq!(detail.item.name, "Rice");
        assert_eq!(detail.images, created.images);
        assert_eq!(detail.category_ids, vec![1]);
    }

    #[tokio::test]
    async fn update_replaces_categories_and_images_wholesale() {
        let db = memory_db().await;
        let (_dir, storage) = temp_storage();
        seed_categories(&db, &storage, &["grains", "staples", "imports"]).await;
        let created = create(&db, &storage, rice_form("[1, 2]", "[]")).await.unwrap();
        let id = created.item.id;
        let old_image = created.images[0].image_link.clone();

        let form = ItemForm {
            name: Some("Basmati".to_string()),
            category_ids: Some(CategoryIds::parse(r#"["3"]"#).unwrap()),
            images: vec![image("a.jpg"), image("b.jpg")],
            ..ItemForm::default()
        };
        update(&db, &storage, id, form).await.unwrap();

        let detail = get(&db, id).await.unwrap();
        assert_eq!(detail.item.name, "Basmati");
        assert_eq!(detail.item.slug, "rice");
        assert_eq!(detail.category_ids, vec![3]);
        assert_eq!(detail.images.len(), 2);
        assert!(!storage.resolve(&old_image).unwrap().exists());
        for image in &detail.images {
            assert!(storage.resolve(&image.image_link).unwrap().exists());
        }
    }

    #[tokio::test]
    async fn failed_update_keeps_previous_state() {
        let db = memory_db().await;
        let (_dir, storage) = temp_storage();
        seed_categories(&db, &storage, &["grains"]).await;
        let created = create(&db, &storage, rice_form("[1]", "[]")).await.unwrap();
        let id = created.item.id;

        let form = ItemForm {
            name: Some("Changed".to_string()),
            category_ids: Some(CategoryIds::parse("[1, 404]").unwrap()),
            images: vec![image("new.jpg")],
            ..ItemForm::default()
        };
        assert!(update(&db, &storage, id, form).await.is_err());

        let detail = get(&db, id).await.unwrap();
        assert_eq!(detail, created);
        assert!(storage.resolve(&created.images[0].image_link).unwrap().exists());
    }

    #[tokio::test]
    async fn delete_cascades_and_removes_files() {
        let db = memory_db().await;
        let (_dir, storage) = temp_storage();
        seed_categories(&db, &storage, &["grains"]).await;
        let created = create(&db, &storage, rice_form("[1]", NORTH_JAN_1)).await.unwrap();
        let id = created.item.id;

        delete(&db, &storage, id).await.unwrap();

        assert!(matches!(get(&db, id).await.unwrap_err(), ApiError::NotFound(_)));
        assert!(repositories::item_price::find_by_item_id(&db, id).await.unwrap().is_empty());
        assert!(repositories::item_category::find_category_ids(&db, id).await.unwrap().is_empty());
        assert!(!storage.resolve(&created.images[0].image_link).unwrap().exists());
        // Categories are only referenced, never deleted with the item
        assert_eq!(services::category::list(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let db = memory_db().await;
        let (_dir, storage) = temp_storage();
        assert!(matches!(
            update(&db, &storage, 5, ItemForm::default()).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            delete(&db, &storage, 5).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn deleting_a_category_drops_its_item_links() {
        let db = memory_db().await;
        let (_dir, storage) = temp_storage();
        let ids = seed_categories(&db, &storage, &["grains", "staples"]).await;
        let created = create(&db, &storage, rice_form("[1, 2]", "[]")).await.unwrap();

        services::category::delete(&db, &storage, ids[0]).await.unwrap();

        let detail = get(&db, created.item.id).await.unwrap();
        assert_eq!(detail.category_ids, vec![ids[1]]);
    }
}
