//! Durable storage for attachment payloads.
//!
//! Files are written under the configured upload directory with a fresh UUID
//! name (keeping the original extension) and addressed by a stable URL made
//! from the public prefix and that name.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use mime_guess::from_path;

use crate::store::{StoreError, StoreResult};

/// An uploaded file held in memory before it is stored.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Declared content type, falling back to a guess from the file name.
    pub fn file_type(&self) -> String {
        self.content_type
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| from_path(&self.file_name).first_or_octet_stream().to_string())
    }
}

#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Persists the payload and returns the URL it is reachable under.
    async fn put(&self, upload: &FileUpload) -> StoreResult<String>;

    /// Removes a previously stored payload by its URL.
    async fn remove(&self, url: &str) -> StoreResult<()>;
}

#[derive(Debug, Clone)]
pub struct LocalUploads {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalUploads {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    fn stored_name(original: &str) -> String {
        let stem = uuid::Uuid::new_v4().to_string();
        match Path::new(original).extension().and_then(|e| e.to_str()) {
            Some(ext) if !ext.is_empty() => format!("{stem}.{ext}"),
            _ => stem,
        }
    }
}

#[async_trait]
impl UploadStore for LocalUploads {
    async fn put(&self, upload: &FileUpload) -> StoreResult<String> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = Self::stored_name(&upload.file_name);
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &upload.bytes).await?;
        debug!("Stored {} bytes at {}", upload.bytes.len(), path.display());

        Ok(format!("{}/{}", self.url_prefix, name))
    }

    async fn remove(&self, url: &str) -> StoreResult<()> {
        let name = url
            .strip_prefix(&self.url_prefix)
            .map(|rest| rest.trim_start_matches('/'))
            .filter(|name| !name.is_empty() && !name.contains('/') && !name.contains(".."))
            .ok_or(StoreError::NotFound("upload"))?;

        tokio::fs::remove_file(self.dir.join(name)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> FileUpload {
        FileUpload {
            file_name: name.to_string(),
            content_type: None,
            bytes: b"%PDF-1.4".to_vec(),
        }
    }

    #[tokio::test]
    async fn stores_under_fresh_name_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = LocalUploads::new(dir.path(), "/uploads/");

        let url = uploads.put(&upload("certificate.pdf")).await.unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".pdf"));

        let name = url.trim_start_matches("/uploads/");
        assert_eq!(std::fs::read(dir.path().join(name)).unwrap(), b"%PDF-1.4");

        uploads.remove(&url).await.unwrap();
        assert!(!dir.path().join(name).exists());
    }

    #[tokio::test]
    async fn refuses_urls_outside_the_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = LocalUploads::new(dir.path(), "/uploads");
        assert!(uploads.remove("/elsewhere/file.pdf").await.is_err());
        assert!(uploads.remove("/uploads/../secret").await.is_err());
    }

    #[test]
    fn file_type_falls_back_to_extension() {
        assert_eq!(upload("photo.png").file_type(), "image/png");
        assert_eq!(upload("blob").file_type(), "application/octet-stream");

        let declared = FileUpload {
            content_type: Some("application/pdf".into()),
            ..upload("scan")
        };
        assert_eq!(declared.file_type(), "application/pdf");
    }
}
