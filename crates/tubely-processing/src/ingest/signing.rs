use std::sync::Arc;
use tubely_core::constants::SIGNED_URL_TTL;
use tubely_core::models::{StorageReference, Video};
use tubely_core::{AppError, PlaybackUrlMode};
use tubely_db::VideoRepository;
use tubely_storage::Storage;

/// Turns persisted `bucket,key` references into time-limited retrieval URLs.
///
/// Does nothing in public playback mode or for records without a reference.
pub struct PlaybackSigner {
    repository: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    mode: PlaybackUrlMode,
}

impl PlaybackSigner {
    pub fn new(
        repository: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        mode: PlaybackUrlMode,
    ) -> Self {
        Self {
            repository,
            storage,
            mode,
        }
    }

    /// Sign the record's reference, store the signed URL on the record and return it.
    ///
    /// After this the record holds a URL rather than a reference, so a later call on the
    /// persisted record fails with `MalformedReference`.
    #[tracing::instrument(skip(self, video), fields(video_id = %video.id))]
    pub async fn sign_video(&self, mut video: Video) -> Result<Video, AppError> {
        let Some(signed_url) = self.presign(&video).await? else {
            return Ok(video);
        };

        video.video_url = Some(signed_url);
        self.repository
            .update_video(&video)
            .await
            .map_err(|e| AppError::RecordUpdate(e.to_string()))?;

        Ok(video)
    }

    /// Return a copy of the record carrying a freshly signed URL. The stored reference is
    /// left as `bucket,key`, so this can run on every read.
    #[tracing::instrument(skip(self, video), fields(video_id = %video.id))]
    pub async fn signed_view(&self, mut video: Video) -> Result<Video, AppError> {
        if let Some(signed_url) = self.presign(&video).await? {
            video.video_url = Some(signed_url);
        }
        Ok(video)
    }

    async fn presign(&self, video: &Video) -> Result<Option<String>, AppError> {
        if self.mode == PlaybackUrlMode::Public {
            return Ok(None);
        }
        let Some(reference) = video.video_url.as_deref() else {
            return Ok(None);
        };

        let reference = StorageReference::parse(reference)?;
        let url = self
            .storage
            .get_presigned_url(&reference.bucket, &reference.key, SIGNED_URL_TTL)
            .await?;

        tracing::debug!(
            bucket = %reference.bucket,
            storage_key = %reference.key,
            "Playback URL signed"
        );

        Ok(Some(url))
    }
}
