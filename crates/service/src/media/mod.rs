//! Media store adapter: upload/delete binary images against an object store.
//!
//! An uploaded image is referenced by a record only after that record
//! commits, so every caller that uploads must either commit a referencing
//! record or call [`release_orphan`] before returning.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

use crate::domain::{ImageUpload, MediaRef};
use common::metrics::{COMPENSATION_FAILURES_TOTAL, MEDIA_COMPENSATIONS_TOTAL};

pub mod http;
pub mod local;

pub use http::HttpMediaStore;
pub use local::LocalMediaStore;

/// MIME types accepted for upload, with the file extension used for ids.
pub const ACCEPTED_TYPES: &[(&str, &str)] = &[("image/png", "png"), ("image/jpeg", "jpeg"), ("image/jpg", "jpg")];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported media type: {0}")]
    UnsupportedType(String),
    #[error("image too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },
    #[error("media store unavailable: {0}")]
    StoreUnavailable(String),
}

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("invalid media id: {0}")]
    InvalidId(String),
    #[error("media store unavailable: {0}")]
    StoreUnavailable(String),
}

/// A compensating delete that did not go through. Logged and counted, never
/// propagated to the caller of the failed operation.
#[derive(Debug, Error)]
#[error("failed to release media {media_id} ({reason}): {source}")]
pub struct CompensationFailure {
    pub media_id: String,
    pub reason: &'static str,
    #[source]
    pub source: DeleteError,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, image: &ImageUpload) -> Result<MediaRef, UploadError>;

    /// Idempotent; an id the store does not know is success.
    async fn delete(&self, media_id: &str) -> Result<(), DeleteError>;
}

/// Check MIME type and size before any I/O. Returns the file extension.
pub fn validate_upload(image: &ImageUpload, max_bytes: usize) -> Result<&'static str, UploadError> {
    let ct = image.content_type.trim().to_ascii_lowercase();
    let ext = ACCEPTED_TYPES
        .iter()
        .find(|(mime, _)| *mime == ct)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| UploadError::UnsupportedType(image.content_type.clone()))?;
    if image.bytes.len() > max_bytes {
        return Err(UploadError::TooLarge { size: image.bytes.len(), limit: max_bytes });
    }
    Ok(ext)
}

/// Delete an uploaded image that no committed record references.
///
/// Never fails: a delete error is logged and counted, and the failure is
/// returned as a report. The operation that triggered compensation keeps its
/// original outcome.
pub async fn release_orphan(store: &dyn MediaStore, media_id: &str, reason: &'static str) -> Option<CompensationFailure> {
    match store.delete(media_id).await {
        Ok(()) => {
            MEDIA_COMPENSATIONS_TOTAL.inc();
            info!(media_id, reason, "media_compensated");
            None
        }
        Err(source) => {
            COMPENSATION_FAILURES_TOTAL.inc();
            let failure = CompensationFailure { media_id: media_id.to_string(), reason, source };
            error!(media_id, reason, error = %failure, "compensation_failed");
            Some(failure)
        }
    }
}

/// In-memory media store for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Assigns ids `m1`, `m2`, ... and records every call.
    pub struct MockMediaStore {
        max_bytes: usize,
        next: AtomicUsize,
        stored: Mutex<HashSet<String>>,
        deletes: Mutex<Vec<String>>,
        calls: AtomicUsize,
        fail_uploads: AtomicBool,
        fail_deletes: AtomicBool,
    }

    impl Default for MockMediaStore {
        fn default() -> Self { Self::with_limit(500_000) }
    }

    impl MockMediaStore {
        pub fn with_limit(max_bytes: usize) -> Self {
            Self {
                max_bytes,
                next: AtomicUsize::new(0),
                stored: Mutex::new(HashSet::new()),
                deletes: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                fail_uploads: AtomicBool::new(false),
                fail_deletes: AtomicBool::new(false),
            }
        }

        pub fn fail_uploads(&self, on: bool) { self.fail_uploads.store(on, Ordering::SeqCst); }
        pub fn fail_deletes(&self, on: bool) { self.fail_deletes.store(on, Ordering::SeqCst); }

        /// Ids passed to `delete`, in call order (including failed attempts).
        pub fn deletes(&self) -> Vec<String> { self.deletes.lock().unwrap().clone() }

        /// Total upload + delete calls.
        pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

        pub fn contains(&self, id: &str) -> bool { self.stored.lock().unwrap().contains(id) }

        pub fn stored_count(&self) -> usize { self.stored.lock().unwrap().len() }
    }

    #[async_trait]
    impl MediaStore for MockMediaStore {
        async fn upload(&self, image: &ImageUpload) -> Result<MediaRef, UploadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            validate_upload(image, self.max_bytes)?;
            if self.fail_uploads.load(Ordering::SeqCst) {
                return Err(UploadError::StoreUnavailable("mock upload failure".into()));
            }
            let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
            let id = format!("m{n}");
            self.stored.lock().unwrap().insert(id.clone());
            Ok(MediaRef { url: format!("https://media.test/{id}"), id })
        }

        async fn delete(&self, media_id: &str) -> Result<(), DeleteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.deletes.lock().unwrap().push(media_id.to_string());
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(DeleteError::StoreUnavailable("mock delete failure".into()));
            }
            self.stored.lock().unwrap().remove(media_id);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockMediaStore;
    use super::*;
    use crate::test_support::png_upload;

    #[test]
    fn validate_accepts_known_types_and_rejects_others() {
        let mut img = png_upload();
        assert_eq!(validate_upload(&img, 100).unwrap(), "png");
        img.content_type = "IMAGE/JPEG".into();
        assert_eq!(validate_upload(&img, 100).unwrap(), "jpeg");
        img.content_type = "image/jpg".into();
        assert_eq!(validate_upload(&img, 100).unwrap(), "jpg");
        img.content_type = "image/gif".into();
        assert!(matches!(validate_upload(&img, 100), Err(UploadError::UnsupportedType(_))));
    }

    #[test]
    fn validate_rejects_oversized() {
        let img = ImageUpload { bytes: vec![0u8; 11], content_type: "image/png".into() };
        match validate_upload(&img, 10) {
            Err(UploadError::TooLarge { size, limit }) => assert_eq!((size, limit), (11, 10)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn mock_assigns_sequential_ids() {
        let store = MockMediaStore::default();
        let a = store.upload(&png_upload()).await.unwrap();
        let b = store.upload(&png_upload()).await.unwrap();
        assert_eq!((a.id.as_str(), b.id.as_str()), ("m1", "m2"));
    }

    #[tokio::test]
    async fn release_twice_is_not_fatal() {
        let store = MockMediaStore::default();
        let m = store.upload(&png_upload()).await.unwrap();
        assert!(release_orphan(&store, &m.id, "test").await.is_none());
        assert!(release_orphan(&store, &m.id, "test").await.is_none());
        assert_eq!(store.deletes(), vec![m.id.clone(), m.id]);
        assert_eq!(store.stored_count(), 0);
    }

    #[tokio::test]
    async fn release_failure_is_reported_not_panicking() {
        let store = MockMediaStore::default();
        store.fail_deletes(true);
        let err = release_orphan(&store, "m9", "test").await.expect("failure report");
        assert_eq!(err.media_id, "m9");
        assert!(matches!(err.source, DeleteError::StoreUnavailable(_)));
    }
}
