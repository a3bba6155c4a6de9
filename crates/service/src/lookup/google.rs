use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{AddressLookup, LookupError, ResolvedAddress};
use crate::domain::{ImageUpload, Location};

/// Google Places: Find Place From Text for resolution, Place Photo for the
/// fallback image.
#[derive(Debug, Clone)]
pub struct GooglePlacesLookup {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    photo_max_width: u32,
}

#[derive(Deserialize)]
struct FindPlaceResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    status: String,
}

#[derive(Deserialize)]
struct Candidate {
    formatted_address: String,
    geometry: Geometry,
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Deserialize)]
struct Photo {
    photo_reference: Option<String>,
}

impl GooglePlacesLookup {
    pub fn new(endpoint: &str, api_key: &str, photo_max_width: u32, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            photo_max_width,
        })
    }

    pub fn from_config(cfg: &configs::LookupConfig) -> anyhow::Result<Self> {
        Self::new(&cfg.endpoint, &cfg.api_key, cfg.photo_max_width, Duration::from_secs(cfg.timeout_secs))
    }
}

#[async_trait]
impl AddressLookup for GooglePlacesLookup {
    async fn resolve(&self, address: &str) -> Result<ResolvedAddress, LookupError> {
        let resp = self
            .client
            .get(format!("{}/findplacefromtext/json", self.endpoint))
            .query(&[
                ("input", address),
                ("inputtype", "textquery"),
                ("fields", "photos,formatted_address,geometry"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Upstream(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(LookupError::Upstream(format!("find place returned {}", resp.status())));
        }
        let body: FindPlaceResponse = resp.json().await.map_err(|e| LookupError::Upstream(e.to_string()))?;
        debug!(status = %body.status, candidates = body.candidates.len(), "find place response");

        match body.status.as_str() {
            "OK" | "ZERO_RESULTS" => {}
            other => return Err(LookupError::Upstream(format!("find place status {other}"))),
        }
        let first = body
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::NotFound(address.to_string()))?;
        Ok(ResolvedAddress {
            formatted_address: first.formatted_address,
            location: first.geometry.location,
            photo_reference: first.photos.into_iter().find_map(|p| p.photo_reference),
        })
    }

    async fn fetch_photo(&self, reference: &str) -> Result<ImageUpload, LookupError> {
        let resp = self
            .client
            .get(format!("{}/photo", self.endpoint))
            .query(&[
                ("maxwidth", self.photo_max_width.to_string()),
                ("photoreference", reference.to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Upstream(e.to_string()))?;
        match resp.status() {
            s if s.is_success() => {}
            reqwest::StatusCode::NOT_FOUND => return Err(LookupError::NoPhoto),
            s => return Err(LookupError::Upstream(format!("photo returned {s}"))),
        }
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .unwrap_or("image/jpeg")
            .trim()
            .to_string();
        let bytes = resp.bytes().await.map_err(|e| LookupError::Upstream(e.to_string()))?;
        Ok(ImageUpload { bytes: bytes.to_vec(), content_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;

    async fn find(Query(q): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
        if q.get("key").map(String::as_str) != Some("gk") {
            return Json(serde_json::json!({ "candidates": [], "status": "REQUEST_DENIED" }));
        }
        match q.get("input").map(String::as_str) {
            Some("1 Main St") => Json(serde_json::json!({
                "candidates": [{
                    "formatted_address": "1 Main St, Springfield",
                    "geometry": { "location": { "lat": 39.8, "lng": -89.6 } },
                    "photos": [{ "photo_reference": "ref-abc" }]
                }],
                "status": "OK"
            })),
            Some("bare lot") => Json(serde_json::json!({
                "candidates": [{
                    "formatted_address": "Bare Lot",
                    "geometry": { "location": { "lat": 1.0, "lng": 2.0 } }
                }],
                "status": "OK"
            })),
            _ => Json(serde_json::json!({ "candidates": [], "status": "ZERO_RESULTS" })),
        }
    }

    async fn photo(Query(q): Query<HashMap<String, String>>) -> axum::response::Response {
        if q.get("photoreference").map(String::as_str) == Some("ref-abc") && q.get("maxwidth").map(String::as_str) == Some("800") {
            ([(header::CONTENT_TYPE, "image/jpeg")], vec![0xffu8, 0xd8, 0xff]).into_response()
        } else {
            StatusCode::NOT_FOUND.into_response()
        }
    }

    async fn lookup(key: &str) -> GooglePlacesLookup {
        let app = Router::new()
            .route("/api/place/findplacefromtext/json", get(find))
            .route("/api/place/photo", get(photo));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        GooglePlacesLookup::new(&format!("http://{addr}/api/place/"), key, 800, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn resolves_first_candidate_with_photo() {
        let g = lookup("gk").await;
        let r = g.resolve("1 Main St").await.unwrap();
        assert_eq!(r.formatted_address, "1 Main St, Springfield");
        assert_eq!(r.location, Location { lat: 39.8, lng: -89.6 });
        assert_eq!(r.photo_reference.as_deref(), Some("ref-abc"));

        let img = g.fetch_photo("ref-abc").await.unwrap();
        assert_eq!(img.content_type, "image/jpeg");
        assert_eq!(img.bytes, vec![0xff, 0xd8, 0xff]);
    }

    #[tokio::test]
    async fn candidate_without_photo_has_no_reference() {
        let g = lookup("gk").await;
        let r = g.resolve("bare lot").await.unwrap();
        assert!(r.photo_reference.is_none());
        assert!(matches!(g.fetch_photo("nope").await, Err(LookupError::NoPhoto)));
    }

    #[tokio::test]
    async fn zero_results_is_not_found_and_denied_is_upstream() {
        let g = lookup("gk").await;
        assert!(matches!(g.resolve("nowhere").await, Err(LookupError::NotFound(_))));
        let bad = lookup("wrong").await;
        assert!(matches!(bad.resolve("1 Main St").await, Err(LookupError::Upstream(_))));
    }
}
