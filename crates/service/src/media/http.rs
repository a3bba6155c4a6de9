use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::{validate_upload, DeleteError, MediaStore, UploadError};
use crate::domain::{ImageUpload, MediaRef};

/// Remote object store reached over HTTP.
///
/// `POST {endpoint}/upload` (multipart `file` + `folder`) answers `{id, url}`;
/// `DELETE {endpoint}/{id}` removes an object. Both carry the API key as a
/// bearer token.
#[derive(Debug, Clone)]
pub struct HttpMediaStore {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    folder: String,
    max_bytes: usize,
}

#[derive(Deserialize)]
struct UploadResponse {
    id: String,
    url: String,
}

impl HttpMediaStore {
    pub fn new(endpoint: &str, api_key: &str, folder: &str, max_bytes: usize, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint.trim_end_matches('/'))?;
        if endpoint.cannot_be_a_base() {
            anyhow::bail!("media endpoint cannot be a base URL: {endpoint}");
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint, api_key: api_key.to_string(), folder: folder.to_string(), max_bytes })
    }

    pub fn from_config(cfg: &configs::MediaConfig) -> anyhow::Result<Self> {
        Self::new(&cfg.endpoint, &cfg.api_key, &cfg.folder, cfg.max_upload_bytes, Duration::from_secs(cfg.timeout_secs))
    }

    fn url_with(&self, segment: &str) -> Url {
        let mut url = self.endpoint.clone();
        // cannot_be_a_base was rejected in `new`
        if let Ok(mut segs) = url.path_segments_mut() {
            segs.pop_if_empty().push(segment);
        }
        url
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn upload(&self, image: &ImageUpload) -> Result<MediaRef, UploadError> {
        let ext = validate_upload(image, self.max_bytes)?;
        let part = multipart::Part::bytes(image.bytes.clone())
            .file_name(format!("upload.{ext}"))
            .mime_str(&image.content_type)
            .map_err(|e| UploadError::UnsupportedType(e.to_string()))?;
        let form = multipart::Form::new().text("folder", self.folder.clone()).part("file", part);

        let resp = self
            .client
            .post(self.url_with("upload"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::StoreUnavailable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(UploadError::StoreUnavailable(format!("upload returned {}", resp.status())));
        }
        let body: UploadResponse = resp.json().await.map_err(|e| UploadError::StoreUnavailable(e.to_string()))?;
        debug!(media_id = %body.id, "uploaded image to remote store");
        Ok(MediaRef { id: body.id, url: body.url })
    }

    async fn delete(&self, media_id: &str) -> Result<(), DeleteError> {
        if media_id.trim().is_empty() {
            return Err(DeleteError::InvalidId(media_id.to_string()));
        }
        let resp = self
            .client
            .delete(self.url_with(media_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| DeleteError::StoreUnavailable(e.to_string()))?;
        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                debug!(media_id, "delete of unknown media id");
                Ok(())
            }
            s => Err(DeleteError::StoreUnavailable(format!("delete returned {s}"))),
        }
    }
}
