use axum::{
    body::Bytes,
    extract::{multipart::Field, Multipart},
};

use super::request::{CategoryIds, PriceEntry};
use crate::errors::{ApiError, ApiResult};

/// Multipart field carrying the category icon.
pub const ICON_FIELD: &str = "file";
/// Multipart field (repeatable) carrying item images.
pub const IMAGE_FIELD: &str = "image_link";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub icon: Option<UploadedFile>,
}

impl CategoryForm {
    pub async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = CategoryForm::default();
        while let Some(field) = next_field(&mut multipart).await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match name.as_str() {
                "name" => form.name = read_text(field).await?,
                "slug" => form.slug = read_text(field).await?,
                ICON_FIELD => {
                    if let Some(file) = read_file(field).await? {
                        form.icon = Some(file);
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ItemForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub slug: Option<String>,
    pub category_ids: Option<CategoryIds>,
    pub prices: Option<Vec<PriceEntry>>,
    pub images: Vec<UploadedFile>,
}

impl ItemForm {
    pub async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = ItemForm::default();
        while let Some(field) = next_field(&mut multipart).await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match name.trim_end_matches("[]") {
                "name" => form.name = read_text(field).await?,
                "description" => form.description = read_text(field).await?,
                "unit" => form.unit = read_text(field).await?,
                "slug" => form.slug = read_text(field).await?,
                "category_ids" => {
                    if let Some(raw) = read_text(field).await? {
                        form.category_ids
                            .get_or_insert_with(CategoryIds::default)
                            .extend_from_str(&raw)?;
                    }
                }
                "price" => {
                    if let Some(raw) = read_text(field).await? {
                        form.prices
                            .get_or_insert_with(Vec::new)
                            .extend(PriceEntry::parse_list(&raw)?);
                    }
                }
                IMAGE_FIELD => {
                    if let Some(file) = read_file(field).await? {
                        form.images.push(file);
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }
}

async fn next_field(multipart: &mut Multipart) -> ApiResult<Option<Field<'_>>> {
    multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidInput(format!("malformed multipart body: {e}")))
}

/// Blank values count as absent.
async fn read_text(field: Field<'_>) -> ApiResult<Option<String>> {
    let text = field
        .text()
        .await
        .map_err(|e| ApiError::InvalidInput(format!("unreadable form field: {e}")))?;
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}

/// Browsers send an empty part when no file was picked; that is skipped.
async fn read_file(field: Field<'_>) -> ApiResult<Option<UploadedFile>> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::InvalidInput(format!("unreadable upload: {e}")))?;
    if file_name.is_empty() && bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(UploadedFile { file_name, bytes }))
}
