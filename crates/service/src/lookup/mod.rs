//! Address resolution collaborator.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ImageUpload, Location};

pub mod google;

pub use google::GooglePlacesLookup;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAddress {
    pub formatted_address: String,
    pub location: Location,
    /// Opaque handle for `fetch_photo`, when the provider has a photo.
    pub photo_reference: Option<String>,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no place found for address: {0}")]
    NotFound(String),
    #[error("no photo available for that address")]
    NoPhoto,
    #[error("lookup provider error: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn resolve(&self, address: &str) -> Result<ResolvedAddress, LookupError>;
    async fn fetch_photo(&self, reference: &str) -> Result<ImageUpload, LookupError>;
}

/// Canned lookup for tests and doc examples
pub mod mock {
    use super::*;

    /// Resolves every address to a fixed point with a photo, unless built
    /// with [`MockLookup::failing`] or [`MockLookup::without_photo`].
    #[derive(Debug, Clone, Default)]
    pub struct MockLookup {
        fail: bool,
        no_photo: bool,
    }

    impl MockLookup {
        pub fn failing() -> Self { Self { fail: true, no_photo: false } }
        pub fn without_photo() -> Self { Self { fail: false, no_photo: true } }
    }

    #[async_trait]
    impl AddressLookup for MockLookup {
        async fn resolve(&self, address: &str) -> Result<ResolvedAddress, LookupError> {
            if self.fail {
                return Err(LookupError::NotFound(address.to_string()));
            }
            Ok(ResolvedAddress {
                formatted_address: address.trim().to_string(),
                location: Location { lat: 40.7484, lng: -73.9857 },
                photo_reference: (!self.no_photo).then(|| "photo-ref-1".to_string()),
            })
        }

        async fn fetch_photo(&self, _reference: &str) -> Result<ImageUpload, LookupError> {
            if self.no_photo {
                return Err(LookupError::NoPhoto);
            }
            Ok(ImageUpload { bytes: b"\xff\xd8\xff\xe0lookup-photo".to_vec(), content_type: "image/jpeg".into() })
        }
    }
}
