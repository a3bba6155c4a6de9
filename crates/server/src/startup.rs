use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use configs::{AppConfig, MediaBackend};
use service::auth::{AuthService, CredentialGate};
use service::lookup::{AddressLookup, GooglePlacesLookup};
use service::media::{HttpMediaStore, LocalMediaStore, MediaStore};
use service::places::PlaceService;
use service::store::{seaorm::SeaOrmRecordStore, RecordStore};

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState, RouterOptions};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire services from their trait objects into shared server state.
pub fn build_state(
    store: Arc<dyn RecordStore>,
    media: Arc<dyn MediaStore>,
    lookup: Arc<dyn AddressLookup>,
    gate: CredentialGate,
) -> ServerState {
    let auth = Arc::new(AuthService::<dyn RecordStore>::new(store.clone(), media.clone(), gate.clone()));
    let places = Arc::new(PlaceService::new(store, media, lookup));
    ServerState { auth, places, gate }
}

async fn build_media(cfg: &configs::MediaConfig) -> anyhow::Result<Arc<dyn MediaStore>> {
    Ok(match cfg.backend {
        MediaBackend::Local => {
            common::env::ensure_dir(&cfg.root_dir).await?;
            Arc::new(LocalMediaStore::from_config(cfg))
        }
        MediaBackend::Http => Arc::new(HttpMediaStore::from_config(cfg)?),
    })
}

/// Build the app from a validated config: connect and migrate the database,
/// construct the media store and lookup, and assemble the router.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;
    info!("database migrations applied");

    let store: Arc<dyn RecordStore> = Arc::new(SeaOrmRecordStore { db });
    let media = build_media(&cfg.media).await?;
    let lookup: Arc<dyn AddressLookup> = Arc::new(GooglePlacesLookup::from_config(&cfg.lookup)?);
    let gate = CredentialGate::from_config(&cfg.auth);

    let state = build_state(store, media, lookup, gate);
    info!(media_backend = ?cfg.media.backend, "services ready");
    Ok(routes::build_router(state, build_cors(), RouterOptions::for_media(&cfg.media)))
}

/// Public entry: build the app and serve until `shutdown` resolves.
pub async fn run_with_config<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))?;
    let app = build_app(&cfg).await?;

    info!(%addr, "starting server");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

/// Load config from the environment and serve until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cfg = AppConfig::load_and_validate()?;
    run_with_config(cfg, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}
