use std::path::PathBuf;

use tokio::fs;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::dealer_request::Attachment;

/// Stores uploaded files on local disk. The directory is served under
/// `/uploads`, so the returned URL stays valid for as long as the file exists.
#[derive(Clone, Debug)]
pub struct StorageService {
    root: PathBuf,
    public_base_url: url::Url,
    max_bytes: usize,
}

impl StorageService {
    pub fn new(root: impl Into<PathBuf>, mut public_base_url: url::Url, max_bytes: usize) -> Self {
        if !public_base_url.path().ends_with('/') {
            let path = format!("{}/", public_base_url.path());
            public_base_url.set_path(&path);
        }
        Self {
            root: root.into(),
            public_base_url,
            max_bytes,
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub async fn save(&self, file_name: &str, content_type: &str, data: &[u8]) -> Result<Attachment> {
        if data.is_empty() {
            return Err(Error::BadRequest("Uploaded file is empty".into()));
        }
        if data.len() > self.max_bytes {
            return Err(Error::PayloadTooLarge(format!(
                "File exceeds the {} byte limit",
                self.max_bytes
            )));
        }

        fs::create_dir_all(&self.root).await?;

        let id = Uuid::new_v4();
        let safe_name = sanitize_file_name(file_name);
        let stored_name = format!("{}-{}", id, safe_name);
        let path = self.root.join(&stored_name);

        fs::write(&path, data).await.map_err(|e| {
            tracing::error!("Failed to write upload {}: {}", stored_name, e);
            Error::Io(e)
        })?;

        let file_url = self
            .public_base_url
            .join(&format!("uploads/{}", stored_name))
            .map_err(|e| Error::Internal(format!("Failed to build file URL: {}", e)))?;

        tracing::info!(file = %stored_name, size = data.len(), "upload stored");

        Ok(Attachment {
            id,
            file_name: safe_name,
            file_type: content_type.to_string(),
            file_size: data.len() as i64,
            file_url: file_url.to_string(),
            uploaded_at: chrono::Utc::now(),
        })
    }
}

/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
/// Leading dots are stripped so nothing lands as a hidden file.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
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
    let trimmed = cleaned.trim_start_matches('.');
    let truncated: String = trimmed.chars().take(100).collect();
    if truncated.is_empty() {
        "file".to_string()
    } else {
        truncated
    }
}
