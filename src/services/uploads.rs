use std::path::Path;

use crate::config::storage::StorageConfig;
use crate::error::{AppError, Result};

/// A file written to the upload directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Name the client sent
    pub original_name: String,
    /// Name on disk, unique per upload
    pub stored_name: String,
    /// Link served under `/uploads`
    pub url: String,
}

/// Write an uploaded file as `<millis>-<sanitized name>`
pub async fn save_upload(
    storage: &StorageConfig,
    original_name: &str,
    bytes: &[u8],
) -> Result<StoredFile> {
    if bytes.len() > storage.max_upload_bytes {
        return Err(AppError::BadRequest(format!(
            "File exceeds the {} MB limit",
            storage.max_upload_bytes / (1024 * 1024)
        )));
    }

    let original_name = base_name(original_name);
    let stored_name = format!(
        "{}-{}",
        chrono::Utc::now().timestamp_millis(),
        sanitize_file_name(&original_name)
    );

    tokio::fs::create_dir_all(&storage.upload_dir).await?;
    tokio::fs::write(storage.upload_dir.join(&stored_name), bytes).await?;

    tracing::info!(file = %stored_name, size = bytes.len(), "Stored upload");

    Ok(StoredFile {
        url: public_link(storage, &stored_name),
        original_name,
        stored_name,
    })
}

/// Remove an upload whose record was never written
pub async fn discard_upload(storage: &StorageConfig, file: &StoredFile) {
    let path = storage.upload_dir.join(&file.stored_name);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => tracing::debug!(file = %file.stored_name, "Discarded upload"),
        Err(e) => tracing::warn!(file = %file.stored_name, error = %e, "Failed to discard upload"),
    }
}

pub fn public_link(storage: &StorageConfig, stored_name: &str) -> String {
    format!("{}/uploads/{}", storage.public_url, stored_name)
}

/// Last path component; browsers on Windows may send full paths
fn base_name(name: &str) -> String {
    let name = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if name.is_empty() {
        "file".to_string()
    } else {
        name.to_string()
    }
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() || Path::new(cleaned).components().count() != 1 {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}
