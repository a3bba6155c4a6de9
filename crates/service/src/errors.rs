use thiserror::Error;

use crate::lookup::LookupError;
use crate::media::UploadError;
use models::errors::ModelError;

/// Record store failures, independent of the backing database.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("database error: {0}")]
    Db(String),
}

impl From<ModelError> for StoreError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(m) => StoreError::Validation(m),
            ModelError::Conflict(m) => StoreError::Conflict(m),
            ModelError::Db(m) => StoreError::Db(m),
        }
    }
}

/// Errors surfaced by the place write coordinator and read path.
/// Every variant is terminal for the request; any compensation has already
/// been attempted by the time one of these is returned.
#[derive(Debug, Error)]
pub enum PlaceError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("address lookup failed: {0}")]
    LookupFailed(String),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("creator not found")]
    CreatorNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("place not found")]
    PlaceNotFound,
    #[error("not allowed to modify this place")]
    Forbidden,
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl PlaceError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            PlaceError::Validation(_) => 2001,
            PlaceError::LookupFailed(_) => 2002,
            PlaceError::Upload(UploadError::UnsupportedType(_)) => 2101,
            PlaceError::Upload(UploadError::TooLarge { .. }) => 2102,
            PlaceError::Upload(UploadError::StoreUnavailable(_)) => 2103,
            PlaceError::CreatorNotFound => 2201,
            PlaceError::UserNotFound => 2202,
            PlaceError::PlaceNotFound => 2203,
            PlaceError::Forbidden => 2301,
            PlaceError::Persistence(_) => 2401,
        }
    }
}

impl From<ModelError> for PlaceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(m) => PlaceError::Validation(m),
            other => PlaceError::Persistence(other.to_string()),
        }
    }
}

impl From<LookupError> for PlaceError {
    fn from(e: LookupError) -> Self { PlaceError::LookupFailed(e.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_per_upload_kind() {
        let a = PlaceError::from(UploadError::UnsupportedType("text/plain".into())).code();
        let b = PlaceError::from(UploadError::TooLarge { size: 2, limit: 1 }).code();
        let c = PlaceError::from(UploadError::StoreUnavailable("down".into())).code();
        assert!(a != b && b != c && a != c);
    }

    #[test]
    fn model_validation_maps_to_validation() {
        let e: PlaceError = ModelError::Validation("title required".into()).into();
        assert!(matches!(e, PlaceError::Validation(_)));
        let e: PlaceError = ModelError::Db("boom".into()).into();
        assert!(matches!(e, PlaceError::Persistence(_)));
    }
}
