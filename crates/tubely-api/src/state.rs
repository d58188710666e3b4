//! Shared application state handed to every handler.

use crate::auth::Authenticator;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{PlaybackSigner, VideoIngestService};
use tubely_storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    pub storage: Arc<dyn Storage>,
    pub ingest: Arc<VideoIngestService>,
    pub signer: Arc<PlaybackSigner>,
    pub authenticator: Arc<dyn Authenticator>,
}
