//! Local object storage for uploaded images.
//!
//! Mirrors the bucket/path/public-URL contract of a hosted blob store:
//! files land under `{root}/{bucket}/` with content-addressed names and
//! are served statically from `{public_base}/{bucket}/{name}`.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
};

/// Bucket for profile avatars
pub const AVATARS_BUCKET: &str = "avatars";
/// Bucket for item photos
pub const ITEM_IMAGES_BUCKET: &str = "item-images";

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

#[derive(Clone)]
pub struct StorageService {
    root: PathBuf,
    public_base: String,
    max_upload_bytes: usize,
}

impl StorageService {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            public_base: config.public_base.trim_end_matches('/').to_string(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Directory served statically for public access
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store an uploaded file and return its public URL.
    ///
    /// Names are the SHA-256 of the content plus the original extension,
    /// so re-uploading the same file is idempotent.
    pub async fn store(&self, bucket: &str, filename: &str, bytes: &[u8]) -> AppResult<String> {
        if bytes.len() > self.max_upload_bytes {
            return Err(AppError::UploadTooLarge(self.max_upload_bytes));
        }

        let extension = Self::extension(filename)?;
        let name = format!("{}.{}", hex::encode(Sha256::digest(bytes)), extension);

        let dir = self.root.join(bucket);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create storage directory: {}", e)))?;

        let path = dir.join(&name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store upload: {}", e)))?;

        Ok(self.public_url(bucket, &name))
    }

    /// Public URL for a stored object
    pub fn public_url(&self, bucket: &str, name: &str) -> String {
        format!("{}/{}/{}", self.public_base, bucket, name)
    }

    fn extension(filename: &str) -> AppResult<String> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            Ok(extension)
        } else {
            Err(AppError::UnsupportedFileType(filename.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(max: usize) -> StorageService {
        StorageService::new(&StorageConfig {
            root: std::env::temp_dir()
                .join(format!("toolshare-test-{}", uuid::Uuid::new_v4()))
                .to_string_lossy()
                .into_owned(),
            public_base: "/uploads".to_string(),
            max_upload_bytes: max,
        })
    }

    #[test]
    fn accepts_known_image_extensions() {
        for name in ["photo.png", "photo.JPG", "photo.jpeg", "photo.webp"] {
            assert!(StorageService::extension(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn rejects_other_extensions() {
        for name in ["run.exe", "notes.txt", "archive.tar.gz", "noextension"] {
            assert!(StorageService::extension(name).is_err(), "{}", name);
        }
    }

    #[tokio::test]
    async fn stores_and_names_by_content() {
        let storage = service(1024);
        let url_a = storage.store("avatars", "a.png", b"image-bytes").await.unwrap();
        let url_b = storage.store("avatars", "b.png", b"image-bytes").await.unwrap();
        // Same content, same object
        assert_eq!(url_a, url_b);
        assert!(url_a.starts_with("/uploads/avatars/"));
        assert!(url_a.ends_with(".png"));

        let name = url_a.rsplit('/').next().unwrap();
        assert!(storage.root().join("avatars").join(name).exists());
    }

    #[tokio::test]
    async fn enforces_size_limit() {
        let storage = service(4);
        let result = storage.store("avatars", "a.png", b"too large").await;
        assert!(matches!(result, Err(AppError::UploadTooLarge(_))));
    }
}
