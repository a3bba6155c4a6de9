pub mod auth;
pub mod form;
pub mod places;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::{metrics::encode_metrics, types::Health};

use crate::openapi::ApiDoc;
use self::auth::ServerState;

/// Local media directory exposed as static files.
#[derive(Debug, Clone)]
pub struct StaticMedia {
    pub public_path: String,
    pub root_dir: String,
}

#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Request body ceiling; kept above the media size limit so oversized
    /// images are rejected by the media adapter with its own error.
    pub body_limit: usize,
    pub static_media: Option<StaticMedia>,
}

impl RouterOptions {
    pub fn for_media(cfg: &configs::MediaConfig) -> Self {
        let static_media = (cfg.backend == configs::MediaBackend::Local)
            .then(|| StaticMedia { public_path: cfg.public_path.clone(), root_dir: cfg.root_dir.clone() });
        Self { body_limit: cfg.max_upload_bytes * 2 + 64 * 1024, static_media }
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> (StatusCode, String) {
    encode_metrics()
}

/// Build the full application router: public reads, user endpoints, and the
/// place writes behind the credential gate.
pub fn build_router(state: ServerState, cors: CorsLayer, opts: RouterOptions) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api/users", get(auth::list_users))
        .route("/api/users/signup", post(auth::signup))
        .route("/api/users/login", post(auth::login))
        .route("/api/places/:pid", get(places::get_place))
        .route("/api/places/user/:uid", get(places::places_by_user));

    let protected = Router::new()
        .route("/api/places", post(places::create_place))
        .route("/api/places/:pid", axum::routing::patch(places::update_place).delete(places::delete_place))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_identity));

    let mut app = public
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    if let Some(media) = opts.static_media {
        app = app.nest_service(&media.public_path, ServeDir::new(media.root_dir));
    }

    app.with_state(state)
        .layer(DefaultBodyLimit::max(opts.body_limit))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
