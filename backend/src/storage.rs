//! Storage for uploaded files

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};

/// Accepted image extensions
const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Stores uploaded bytes and hands back the reference to persist
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn store(&self, folder: &str, original_name: &str, bytes: &[u8]) -> AppResult<String>;
}

/// Files on the local disk, served back under `/img`
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.upload_dir),
        }
    }

    /// Directory served at `/img`
    pub fn image_root(&self) -> PathBuf {
        self.root.join("img")
    }
}

/// Lower-cased extension of an accepted image file name
pub fn image_extension(original_name: &str) -> AppResult<String> {
    let extension = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| {
            AppError::validation(
                "image",
                format!("Image must be one of: {}", IMAGE_EXTENSIONS.join(", ")),
            )
        })?;
    Ok(extension)
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, folder: &str, original_name: &str, bytes: &[u8]) -> AppResult<String> {
        let extension = image_extension(original_name)?;
        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let dir = self.image_root().join(folder);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;
        tokio::fs::write(dir.join(&file_name), bytes)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        tracing::info!("Stored upload {} in {}", file_name, folder);
        Ok(format!("/img/{}/{}", folder, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("photo.PNG").unwrap(), "png");
        assert_eq!(image_extension("a.b.jpeg").unwrap(), "jpeg");
        assert!(image_extension("notes.txt").is_err());
        assert!(image_extension("noextension").is_err());
    }

    #[tokio::test]
    async fn test_store_writes_under_folder() {
        let upload_dir = std::env::temp_dir().join(format!("ims-upload-{}", Uuid::new_v4()));
        let storage = LocalFileStorage::new(&StorageConfig {
            upload_dir: upload_dir.to_string_lossy().to_string(),
            max_upload_bytes: 1024,
        });

        let reference = storage.store("product", "drill.png", b"png-bytes").await.unwrap();
        assert!(reference.starts_with("/img/product/"));
        assert!(reference.ends_with(".png"));

        let on_disk = upload_dir.join(reference.trim_start_matches('/'));
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"png-bytes");

        std::fs::remove_dir_all(upload_dir).ok();
    }
}
