use thiserror::Error;

use crate::errors::StoreError;
use crate::media::UploadError;

/// Business errors for the credential gate and auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication required")]
    MissingCredential,
    #[error("invalid or expired token")]
    InvalidCredential,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("user already exists")]
    Conflict,
    #[error("invalid credentials")]
    Unauthorized,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict => 1002,
            AuthError::Unauthorized => 1004,
            AuthError::MissingCredential => 1005,
            AuthError::InvalidCredential => 1006,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Persistence(_) => 1200,
            AuthError::Upload(UploadError::UnsupportedType(_)) => 1301,
            AuthError::Upload(UploadError::TooLarge { .. }) => 1302,
            AuthError::Upload(UploadError::StoreUnavailable(_)) => 1303,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(_) => AuthError::Conflict,
            StoreError::Validation(m) => AuthError::Validation(m),
            other => AuthError::Persistence(other.to_string()),
        }
    }
}
