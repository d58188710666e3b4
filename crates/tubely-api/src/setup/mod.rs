//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::auth::{Authenticator, JwtAuthenticator};
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_processing::{FfprobeProber, IngestConfig, PlaybackSigner, VideoIngestService};
use tubely_storage::create_storage;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format)
        .context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment,
        storage_backend = %config.storage_backend,
        playback_url_mode = %config.playback_url_mode,
        "Configuration loaded and validated successfully"
    );

    let state = build_state(config).await?;
    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}

/// Wire repositories, storage and services for `config`.
pub async fn build_state(config: Config) -> Result<Arc<AppState>> {
    let storage = create_storage(&config)
        .await
        .context("Failed to initialize storage")?;

    let prober = FfprobeProber::new(config.ffprobe_path.clone(), config.probe_timeout())
        .context("Invalid FFPROBE_PATH")?;

    let videos: Arc<dyn VideoRepository> = Arc::new(InMemoryVideoRepository::new());
    let authenticator: Arc<dyn Authenticator> = Arc::new(JwtAuthenticator::new(&config.jwt_secret));

    Ok(Arc::new(assemble_state(
        config,
        videos,
        storage,
        Arc::new(prober),
        authenticator,
    )))
}

/// Build the state from already constructed collaborators.
pub fn assemble_state(
    config: Config,
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn tubely_storage::Storage>,
    prober: Arc<dyn tubely_processing::VideoProber>,
    authenticator: Arc<dyn Authenticator>,
) -> AppState {
    let ingest = VideoIngestService::new(
        videos.clone(),
        storage.clone(),
        prober,
        IngestConfig::from_config(&config),
    );
    let signer = PlaybackSigner::new(videos.clone(), storage.clone(), config.playback_url_mode);

    AppState {
        config,
        videos,
        storage,
        ingest: Arc::new(ingest),
        signer: Arc::new(signer),
        authenticator,
    }
}
