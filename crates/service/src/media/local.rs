use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use super::{validate_upload, DeleteError, MediaStore, UploadError};
use crate::domain::{ImageUpload, MediaRef};

/// Media store backed by a directory on local disk.
///
/// Ids are `<uuid>.<ext>` file names; URLs are `<public_path>/<id>`, served
/// by the HTTP layer as static files.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
    public_path: String,
    max_bytes: usize,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, public_path: &str, max_bytes: usize) -> Self {
        Self { root: root.into(), public_path: public_path.trim_end_matches('/').to_string(), max_bytes }
    }

    pub fn from_config(cfg: &configs::MediaConfig) -> Self {
        Self::new(&cfg.root_dir, &cfg.public_path, cfg.max_upload_bytes)
    }

    pub fn root(&self) -> &PathBuf { &self.root }

    fn path_for(&self, media_id: &str) -> Result<PathBuf, DeleteError> {
        let bad = media_id.is_empty()
            || media_id.contains('/')
            || media_id.contains('\\')
            || media_id.contains("..");
        if bad {
            return Err(DeleteError::InvalidId(media_id.to_string()));
        }
        Ok(self.root.join(media_id))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn upload(&self, image: &ImageUpload) -> Result<MediaRef, UploadError> {
        let ext = validate_upload(image, self.max_bytes)?;
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| UploadError::StoreUnavailable(e.to_string()))?;
        let id = format!("{}.{}", Uuid::new_v4(), ext);
        fs::write(self.root.join(&id), &image.bytes)
            .await
            .map_err(|e| UploadError::StoreUnavailable(e.to_string()))?;
        debug!(media_id = %id, size = image.bytes.len(), "stored image on disk");
        Ok(MediaRef { url: format!("{}/{}", self.public_path, id), id })
    }

    async fn delete(&self, media_id: &str) -> Result<(), DeleteError> {
        let path = self.path_for(media_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(media_id, "delete of unknown media id");
                Ok(())
            }
            Err(e) => Err(DeleteError::StoreUnavailable(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::png_upload;

    fn temp_store() -> LocalMediaStore {
        let dir = std::env::temp_dir().join(format!("placeshare-media-{}", Uuid::new_v4()));
        LocalMediaStore::new(dir, "/uploads/images/", 1024)
    }

    #[tokio::test]
    async fn upload_then_delete_twice() {
        let store = temp_store();
        let m = store.upload(&png_upload()).await.unwrap();
        assert!(m.id.ends_with(".png"));
        assert_eq!(m.url, format!("/uploads/images/{}", m.id));
        assert!(store.root().join(&m.id).exists());

        store.delete(&m.id).await.unwrap();
        assert!(!store.root().join(&m.id).exists());
        store.delete(&m.id).await.unwrap();

        let _ = std::fs::remove_dir_all(store.root());
    }

    #[tokio::test]
    async fn rejects_path_traversal_ids() {
        let store = temp_store();
        for id in ["../etc/passwd", "a/b.png", "", ".."] {
            assert!(matches!(store.delete(id).await, Err(DeleteError::InvalidId(_))), "{id}");
        }
    }

    #[tokio::test]
    async fn rejects_before_touching_disk() {
        let store = temp_store();
        let gif = ImageUpload { bytes: vec![1, 2, 3], content_type: "image/gif".into() };
        assert!(matches!(store.upload(&gif).await, Err(UploadError::UnsupportedType(_))));
        let big = ImageUpload { bytes: vec![0; 2048], content_type: "image/png".into() };
        assert!(matches!(store.upload(&big).await, Err(UploadError::TooLarge { .. })));
        assert!(!store.root().exists());
    }
}
