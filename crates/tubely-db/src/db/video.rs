use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tubely_core::models::{CreateVideoParams, Video};
use tubely_core::AppError;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Video not found: {0}")]
    NotFound(Uuid),

    #[error("Record store error: {0}")]
    Backend(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => AppError::NotFound(format!("Video {} not found", id)),
            RepositoryError::Backend(msg) => AppError::Internal(msg),
        }
    }
}

/// Key-value store of video records keyed by video id.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Create a draft record owned by `user_id` with no storage reference.
    async fn create_video(
        &self,
        user_id: Uuid,
        params: CreateVideoParams,
    ) -> RepositoryResult<Video>;

    async fn get_video(&self, id: Uuid) -> RepositoryResult<Option<Video>>;

    /// Replace a stored record. Fails with `NotFound` when no record has this id.
    async fn update_video(&self, video: &Video) -> RepositoryResult<()>;
}

/// Process-local record store.
#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: RwLock<HashMap<Uuid, Video>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as-is, overwriting any existing record with the same id.
    pub async fn insert(&self, video: Video) {
        self.videos.write().await.insert(video.id, video);
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    #[tracing::instrument(skip(self, params), fields(db.table = "videos", db.operation = "insert", user_id = %user_id))]
    async fn create_video(
        &self,
        user_id: Uuid,
        params: CreateVideoParams,
    ) -> RepositoryResult<Video> {
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            user_id,
            title: params.title,
            description: params.description,
            video_url: None,
            created_at: now,
            updated_at: now,
        };

        self.videos.write().await.insert(video.id, video.clone());

        tracing::debug!(video_id = %video.id, "Video record created");
        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get_video(&self, id: Uuid) -> RepositoryResult<Option<Video>> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "update", db.record_id = %video.id))]
    async fn update_video(&self, video: &Video) -> RepositoryResult<()> {
        let mut videos = self.videos.write().await;
        let existing = videos
            .get_mut(&video.id)
            .ok_or(RepositoryError::NotFound(video.id))?;

        *existing = Video {
            updated_at: Utc::now(),
            ..video.clone()
        };
        Ok(())
    }
}
