use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::Utc;
use rand::Rng;
use tracing::{debug, info, warn};

/// URL prefix under which the upload directory is served.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Icons,
    Items,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Icons => "icons",
            Bucket::Items => "items",
        }
    }
}

/// Disk-backed store for uploaded files, one subdirectory per bucket.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `bytes` into `bucket` and returns the server-relative path,
    /// e.g. `/uploads/icons/1700000000000-42-logo.png`.
    pub async fn store(&self, bytes: &[u8], original_name: &str, bucket: Bucket) -> io::Result<String> {
        let dir = self.root.join(bucket.as_str());
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = unique_file_name(original_name);
        tokio::fs::write(dir.join(&file_name), bytes).await?;

        let relative = format!("{PUBLIC_PREFIX}/{}/{file_name}", bucket.as_str());
        info!(path = %relative, size = bytes.len(), "Stored uploaded file");
        Ok(relative)
    }

    /// Best-effort removal. Never fails; problems are logged and dropped.
    pub async fn delete(&self, relative_path: &str) {
        let Some(path) = self.resolve(relative_path) else {
            warn!(path = %relative_path, "Refusing to delete file outside the upload directory");
            return;
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => info!(path = %relative_path, "Deleted uploaded file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %relative_path, "Uploaded file already absent")
            }
            Err(e) => warn!(path = %relative_path, error = %e, "Failed to delete uploaded file"),
        }
    }

    pub async fn delete_all<I, S>(&self, relative_paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in relative_paths {
            self.delete(path.as_ref()).await;
        }
    }

    /// Maps a stored path or absolute URL back onto the upload directory.
    pub fn resolve(&self, relative_path: &str) -> Option<PathBuf> {
        let marker = format!("{PUBLIC_PREFIX}/");
        let rest = match relative_path.find(&marker) {
            Some(idx) => &relative_path[idx + marker.len()..],
            None => relative_path.strip_prefix("uploads/")?,
        };

        let mut path = self.root.clone();
        for segment in rest.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return None;
            }
            path.push(segment);
        }
        Some(path)
    }
}

/// `<millis>-<random>-<sanitized original name>`
pub fn unique_file_name(original_name: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        suffix,
        sanitize_file_name(original_name)
    )
}

pub fn sanitize_file_name(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Joins a base like `http://host:3000` with a stored path.
pub fn url_for(base_url: &str, relative_path: &str) -> String {
    if relative_path.starts_with("http://") || relative_path.starts_with("https://") {
        return relative_path.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if relative_path.starts_with('/') {
        format!("{base}{relative_path}")
    } else {
        format!("{base}/{relative_path}")
    }
}
