//! Upload orchestration
//!
//! `Received -> Authorized -> Staged -> Probed -> Classified -> Uploaded -> Published`.
//! Every step can abort; the staged file is released whichever step was reached.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;
use tubely_core::constants::ACCEPTED_VIDEO_MEDIA_TYPE;
use tubely_core::models::{StorageReference, Video};
use tubely_core::{AppError, Config, PlaybackUrlMode};
use tubely_db::VideoRepository;
use tubely_storage::keys::{extension_for_media_type, generate_video_key};
use tubely_storage::Storage;
use uuid::Uuid;

use crate::staging::{normalize_media_type, StagingStore};
use crate::video::{classify_orientation, VideoProber};

/// Settings for the ingestion pipeline
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub staging_dir: PathBuf,
    pub max_upload_size_bytes: u64,
    pub store_upload_timeout: Duration,
    pub playback_url_mode: PlaybackUrlMode,
}

impl IngestConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            staging_dir: config.staging_dir(),
            max_upload_size_bytes: config.max_upload_size_bytes,
            store_upload_timeout: config.store_upload_timeout(),
            playback_url_mode: config.playback_url_mode,
        }
    }
}

pub struct VideoIngestService {
    repository: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    prober: Arc<dyn VideoProber>,
    staging: StagingStore,
    config: IngestConfig,
}

impl VideoIngestService {
    pub fn new(
        repository: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        prober: Arc<dyn VideoProber>,
        config: IngestConfig,
    ) -> Self {
        let staging = StagingStore::new(config.staging_dir.clone(), config.max_upload_size_bytes);
        Self {
            repository,
            storage,
            prober,
            staging,
            config,
        }
    }

    /// Ingest an uploaded video for `video_id` on behalf of `uploader_id`.
    ///
    /// Returns the updated record. Its `video_url` is the `bucket,key` reference in signed
    /// mode and the canonical object URL in public mode.
    #[tracing::instrument(skip(self, body), fields(video_id = %video_id, user_id = %uploader_id))]
    pub async fn ingest<R>(
        &self,
        video_id: Uuid,
        uploader_id: Uuid,
        content_type: &str,
        body: R,
    ) -> Result<Video, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let start = std::time::Instant::now();

        // Authorized
        let mut video = self
            .repository
            .get_video(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

        if video.user_id != uploader_id {
            return Err(AppError::Authorization(
                "User is not the owner of this video".to_string(),
            ));
        }

        let media_type = normalize_media_type(content_type);
        if media_type != ACCEPTED_VIDEO_MEDIA_TYPE {
            return Err(AppError::UnsupportedMediaType(format!(
                "Expected {}, got '{}'",
                ACCEPTED_VIDEO_MEDIA_TYPE, content_type
            )));
        }
        let extension = extension_for_media_type(&media_type)?;

        // Staged
        let mut staged = self.staging.stage(extension, body).await?;

        // Probed
        let geometry = self.prober.probe(staged.path()).await.map_err(|e| {
            tracing::warn!(error = %e, "Video probe failed");
            AppError::from(e)
        })?;

        // Classified
        let orientation = classify_orientation(geometry);
        let storage_key = generate_video_key(orientation, &media_type)?;

        // Uploaded
        let reader = staged.reader().await?;
        let upload = self.storage.upload_stream(
            &storage_key,
            content_type,
            Some(staged.size()),
            Box::pin(reader),
        );
        let object_url = tokio::time::timeout(self.config.store_upload_timeout, upload)
            .await
            .map_err(|_| {
                AppError::StoreWrite(format!(
                    "Upload of {} timed out after {:?}",
                    storage_key, self.config.store_upload_timeout
                ))
            })??;

        // Published
        video.video_url = Some(match self.config.playback_url_mode {
            PlaybackUrlMode::Signed => {
                StorageReference::new(self.storage.bucket(), storage_key.clone()).encode()
            }
            PlaybackUrlMode::Public => object_url,
        });

        self.repository.update_video(&video).await.map_err(|e| {
            tracing::error!(
                error = %e,
                storage_key = %storage_key,
                "Video stored but record update failed"
            );
            AppError::RecordUpdate(e.to_string())
        })?;

        tracing::info!(
            storage_key = %storage_key,
            orientation = %orientation,
            width = geometry.width,
            height = geometry.height,
            size_bytes = staged.size(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video ingested"
        );

        Ok(video)
    }
}
