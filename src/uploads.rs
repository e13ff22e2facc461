//! Image upload persistence.
//!
//! Files are content-addressed: the stored name is derived from a SHA-256 of
//! the bytes, so re-uploading the same picture reuses one file.

use async_trait::async_trait;
use axum::body::Bytes;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload storage failed: {0}")]
    Io(#[from] std::io::Error),
}

/// An image part received from a multipart request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub original_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

impl Upload {
    /// Only `image/*` parts count as uploads; anything else is dropped.
    pub fn is_image(content_type: &str) -> bool {
        content_type.starts_with("image/")
    }

    fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "img",
        }
    }

    /// Stored filename: 32 hex chars of the content hash plus an extension.
    pub fn stored_name(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        let hash = format!("{:x}", hasher.finalize());
        format!("{}.{}", &hash[..32], self.extension())
    }
}

#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Persists the upload and returns the filename recorded on the cat.
    async fn save(&self, upload: &Upload) -> Result<String, UploadError>;
}

pub struct DiskUploadStore {
    dir: PathBuf,
}

impl DiskUploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl UploadStore for DiskUploadStore {
    async fn save(&self, upload: &Upload) -> Result<String, UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let filename = upload.stored_name();
        tokio::fs::write(self.dir.join(&filename), &upload.bytes).await?;
        tracing::debug!(
            "Stored upload {:?} ({} bytes) as {}",
            upload.original_name,
            upload.bytes.len(),
            filename
        );
        Ok(filename)
    }
}
