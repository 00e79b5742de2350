use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::info;

use super::{required, store_files};
use crate::{
    dto::form::CategoryForm,
    entity::category,
    errors::{ApiError, ApiResult},
    repositories,
    utils::storage::{Bucket, Storage},
};

pub async fn create(
    db: &DatabaseConnection,
    storage: &Storage,
    form: CategoryForm,
) -> ApiResult<category::Model> {
    let name = required(&form.name, "name")?;
    let slug = required(&form.slug, "slug")?;
    let icon = form
        .icon
        .as_ref()
        .ok_or_else(|| ApiError::InvalidInput("icon file is required".to_string()))?;

    let stored = store_files(storage, std::slice::from_ref(icon), Bucket::Icons).await?;
    let icon_path = &stored[0];

    match repositories::category::save(db, name, slug, icon_path).await {
        Ok(created) => {
            info!(id = created.id, slug = %created.slug, "Category created");
            Ok(created)
        }
        Err(e) => {
            storage.delete(icon_path).await;
            Err(e.into())
        }
    }
}

pub async fn list(db: &DatabaseConnection) -> ApiResult<Vec<category::Model>> {
    Ok(repositories::category::find_all(db).await?)
}

/// Partial update. A replaced icon file is removed only once the new row
/// is committed.
pub async fn update(
    db: &DatabaseConnection,
    storage: &Storage,
    id: i32,
    form: CategoryForm,
) -> ApiResult<category::Model> {
    let transaction = db.begin().await?;
    let existing = repositories::category::find_by_id(&transaction, id)
        .await?
        .ok_or(ApiError::NotFound("Category"))?;

    let new_icon = match &form.icon {
        Some(file) => store_files(storage, std::slice::from_ref(file), Bucket::Icons)
            .await?
            .pop(),
        None => None,
    };

    let old_icon = existing.icon.clone();
    match apply_update(transaction, existing, &form, new_icon.as_deref()).await {
        Ok(updated) => {
            if new_icon.is_some() {
                storage.delete(&old_icon).await;
            }
            info!(id, "Category updated");
            Ok(updated)
        }
        Err(e) => {
            if let Some(path) = &new_icon {
                storage.delete(path).await;
            }
            Err(e)
        }
    }
}

async fn apply_update(
    transaction: DatabaseTransaction,
    existing: category::Model,
    form: &CategoryForm,
    icon: Option<&str>,
) -> ApiResult<category::Model> {
    let updated = repositories::category::update(
        &transaction,
        existing,
        form.name.as_deref(),
        form.slug.as_deref(),
        icon,
    )
    .await?;
    transaction.commit().await?;
    Ok(updated)
}

/// Removes the category and its item links, then its icon file.
pub async fn delete(db: &DatabaseConnection, storage: &Storage, id: i32) -> ApiResult<()> {
    let transaction = db.begin().await?;
    let existing = repositories::category::find_by_id(&transaction, id)
        .await?
        .ok_or(ApiError::NotFound("Category"))?;

    let unlinked = repositories::item_category::delete_by_category_id(&transaction, id).await?;
    repositories::category::delete_by_id(&transaction, id).await?;
    transaction.commit().await?;

    storage.delete(&existing.icon).await;
    info!(id, unlinked, "Category deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::form::UploadedFile,
        services::test_support::{memory_db, temp_storage},
    };
    use axum::body::Bytes;

    fn icon(name: &str) -> Option<UploadedFile> {
        Some(UploadedFile {
            file_name: name.to_string(),
            bytes: Bytes::from_static(b"\x89PNG"),
        })
    }

    fn form(name: &str, slug: &str, file: &str) -> CategoryForm {
        CategoryForm {
            name: Some(name.to_string()),
            slug: Some(slug.to_string()),
            icon: icon(file),
        }
    }

    #[tokio::test]
    async fn create_requires_every_field() {
        let db = memory_db().await;
        let (_dir, storage) = temp_storage();

        for incomplete in [
            CategoryForm { name: None, ..form("Grains", "grains", "g.png") },
            CategoryForm { slug: None, ..form("Grains", "grains", "g.png") },
            CategoryForm { icon: None, ..form("Grains", "grains", "g.png") },
        ] {
            let err = create(&db, &storage, incomplete).await.unwrap_err();
            assert!(matches!(err, ApiError::InvalidInput(_)));
        }
        assert!(list(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_then_list_round_trips() {
        let db = memory_db().await;
        let (_dir, storage) = temp_storage();

        let created = create(&db, &storage, form("Grains", "grains", "g.png")).await.unwrap();
        assert!(created.icon.starts_with("/uploads/icons/"));
        assert!(storage.resolve(&created.icon).unwrap().exists());

        let all = list(&db).await.unwrap();
        assert_eq!(all, vec![created]);
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_conflict_and_leaves_no_file() {
        let db = memory_db().await;
        let (dir, storage) = temp_storage();

        create(&db, &storage, form("Grains", "grains", "g.png")).await.unwrap();
        let err = create(&db, &storage, form("Other", "grains", "o.png")).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let files = std::fs::read_dir(dir.path().join("icons")).unwrap().count();
        assert_eq!(files, 1);
    }

    #[tokio::test]
    async fn update_without_icon_keeps_icon_and_file() {
        let db = memory_db().await;
        let (_dir, storage) = temp_storage();
        let created = create(&db, &storage, form("Grains", "grains", "g.png")).await.unwrap();

        for _ in 0..2 {
            let updated = update(
                &db,
                &storage,
                created.id,
                CategoryForm {
                    name: Some("Cereals".to_string()),
                    slug: Some("grains".to_string()),
                    icon: None,
                },
            )
            .await
            .unwrap();
            assert_eq!(updated.name, "Cereals");
            assert_eq!(updated.icon, created.icon);
        }
        assert!(storage.resolve(&created.icon).unwrap().exists());
    }

    #[tokio::test]
    async fn update_with_icon_replaces_the_old_file() {
        let db = memory_db().await;
        let (_dir, storage) = temp_storage();
        let created = create(&db, &storage, form("Grains", "grains", "g.png")).await.unwrap();

        let updated = update(
            &db,
            &storage,
            created.id,
            CategoryForm {
                name: None,
                slug: None,
                icon: icon("new.png"),
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "Grains");
        assert_ne!(updated.icon, created.icon);
        assert!(updated.icon.ends_with("-new.png"));
        assert!(!storage.resolve(&created.icon).unwrap().exists());
        assert!(storage.resolve(&updated.icon).unwrap().exists());
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_category_are_not_found() {
        let db = memory_db().await;
        let (dir, storage) = temp_storage();

        let err = update(&db, &storage, 42, form("x", "x", "x.png")).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        // The icon must not be written when the category is missing
        assert!(!dir.path().join("icons").exists());

        let err = delete(&db, &storage, 42).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_row_and_icon() {
        let db = memory_db().await;
        let (_dir, storage) = temp_storage();
        let created = create(&db, &storage, form("Grains", "grains", "g.png")).await.unwrap();

        delete(&db, &storage, created.id).await.unwrap();
        assert!(list(&db).await.unwrap().is_empty());
        assert!(!storage.resolve(&created.icon).unwrap().exists());
    }
}
