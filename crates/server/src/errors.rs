use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use service::auth::errors::AuthError;
use service::errors::PlaceError;
use service::media::UploadError;

/// Error body rendered as `{"error", "code", "detail"}`.
#[derive(Debug, Serialize)]
pub struct JsonApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: &'static str,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, code: u16, detail: impl Into<String>) -> Self {
        Self { status, error, code, detail: Some(detail.into()) }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", 4000, detail)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, code = self.code, detail = ?self.detail, "request failed");
        }
        (self.status, Json(self)).into_response()
    }
}

fn upload_status(e: &UploadError) -> (StatusCode, &'static str) {
    match e {
        UploadError::UnsupportedType(_) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_media_type"),
        UploadError::TooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
        UploadError::StoreUnavailable(_) => (StatusCode::BAD_GATEWAY, "media_store_unavailable"),
    }
}

impl From<PlaceError> for JsonApiError {
    fn from(e: PlaceError) -> Self {
        let (status, kind) = match &e {
            PlaceError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed"),
            PlaceError::LookupFailed(_) => (StatusCode::UNPROCESSABLE_ENTITY, "lookup_failed"),
            PlaceError::Upload(u) => upload_status(u),
            PlaceError::CreatorNotFound => (StatusCode::NOT_FOUND, "creator_not_found"),
            PlaceError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found"),
            PlaceError::PlaceNotFound => (StatusCode::NOT_FOUND, "place_not_found"),
            PlaceError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            PlaceError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "persistence_failed"),
        };
        JsonApiError::new(status, kind, e.code(), e.to_string())
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let (status, kind) = match &e {
            AuthError::MissingCredential => (StatusCode::UNAUTHORIZED, "missing_credential"),
            AuthError::InvalidCredential => (StatusCode::UNAUTHORIZED, "invalid_credential"),
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AuthError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed"),
            AuthError::Conflict => (StatusCode::CONFLICT, "conflict"),
            AuthError::Upload(u) => upload_status(u),
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Persistence(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };
        JsonApiError::new(status, kind, e.code(), e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
