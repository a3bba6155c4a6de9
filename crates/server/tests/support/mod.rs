#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;

use server::routes::{build_router, RouterOptions};
use server::startup::build_state;
use service::auth::CredentialGate;
use service::lookup::mock::MockLookup;
use service::media::mock::MockMediaStore;
use service::store::mock::MockRecordStore;

pub const BOUNDARY: &str = "placeshare-test-boundary";
pub const MAX_UPLOAD: usize = 1024;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MockRecordStore>,
    pub media: Arc<MockMediaStore>,
    pub gate: CredentialGate,
}

pub fn app() -> TestApp {
    let store = Arc::new(MockRecordStore::default());
    let media = Arc::new(MockMediaStore::with_limit(MAX_UPLOAD));
    let gate = CredentialGate::new("test-secret", 3600);
    let state = build_state(store.clone(), media.clone(), Arc::new(MockLookup::default()), gate.clone());
    let opts = RouterOptions { body_limit: MAX_UPLOAD * 4, static_media: None };
    let router = build_router(state, tower_http::cors::CorsLayer::very_permissive(), opts);
    TestApp { router, store, media, gate }
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

/// Encode a multipart/form-data body by hand.
pub fn multipart(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, content_type, bytes) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"upload\"\r\nContent-Type: {content_type}\r\n\r\n")
                        .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(method: &str, uri: &str, token: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    let mut b = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(t) = token {
        b = b.header("authorization", format!("Bearer {t}"));
    }
    b.body(Body::from(multipart(parts))).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut b = Request::builder().method(method).uri(uri).header("content-type", "application/json");
    if let Some(t) = token {
        b = b.header("authorization", format!("Bearer {t}"));
    }
    b.body(Body::from(serde_json::to_vec(&body).unwrap())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        b = b.header("authorization", format!("Bearer {t}"));
    }
    b.body(Body::empty()).unwrap()
}

pub async fn send(router: &Router, req: Request<Body>) -> (axum::http::StatusCode, serde_json::Value) {
    let resp: Response<Body> = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { serde_json::Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null) };
    (status, json)
}

pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-image";
