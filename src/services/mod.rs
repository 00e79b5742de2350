pub mod auth;
pub mod category;
pub mod item;

use crate::{
    dto::form::UploadedFile,
    errors::{ApiError, ApiResult},
    utils::storage::{Bucket, Storage},
};

/// Stores every file or none: on the first failure the files already
/// written are removed again.
pub(crate) async fn store_files(
    storage: &Storage,
    files: &[UploadedFile],
    bucket: Bucket,
) -> ApiResult<Vec<String>> {
    let mut stored = Vec::with_capacity(files.len());
    for file in files {
        match storage.store(&file.bytes, &file.file_name, bucket).await {
            Ok(path) => stored.push(path),
            Err(e) => {
                storage.delete_all(&stored).await;
                return Err(ApiError::Internal(format!(
                    "failed to store upload '{}': {}",
                    file.file_name, e
                )));
            }
        }
    }
    Ok(stored)
}

/// Treats a missing required text field as invalid input.
pub(crate) fn required<'a>(value: &'a Option<String>, field: &str) -> ApiResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| ApiError::InvalidInput(format!("{field} is required")))
}
