use std::collections::HashMap;

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;

use crate::errors::JsonApiError;
use service::domain::ImageUpload;

/// Text fields plus the optional `image` file of a multipart form.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub image: Option<ImageUpload>,
}

impl FormData {
    /// Field value, or empty when absent so validation reports it.
    pub fn text(&self, name: &str) -> String { self.fields.get(name).cloned().unwrap_or_default() }
}

fn form_error(e: MultipartError) -> JsonApiError {
    JsonApiError::new(e.status(), "invalid_form", 4001, e.body_text())
}

/// Collect a multipart body. An `image` part with no bytes counts as absent.
pub async fn read_form(mut mp: Multipart) -> Result<FormData, JsonApiError> {
    let mut form = FormData::default();
    while let Some(field) = mp.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
            let bytes = field.bytes().await.map_err(form_error)?;
            if !bytes.is_empty() {
                form.image = Some(ImageUpload { bytes: bytes.to_vec(), content_type });
            }
        } else {
            let value = field.text().await.map_err(form_error)?;
            form.fields.insert(name, value);
        }
    }
    Ok(form)
}
