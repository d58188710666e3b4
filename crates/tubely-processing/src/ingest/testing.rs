//! Fakes shared by the orchestrator and signer tests.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::stream;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio::sync::Mutex;
use tubely_core::models::{CreateVideoParams, StreamGeometry, Video};
use tubely_core::{PlaybackUrlMode, StorageBackend};
use tubely_db::{InMemoryVideoRepository, RepositoryError, RepositoryResult, VideoRepository};
use tubely_storage::{Storage, StorageError, StorageResult, StorageStream};
use uuid::Uuid;

use super::{IngestConfig, VideoIngestService};
use crate::video::{ProbeError, VideoProber};

pub(crate) fn staging_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// Yields one chunk, then never makes progress again, like a client that stalls mid-upload.
#[derive(Default)]
pub(crate) struct StallingReader {
    sent: bool,
}

impl AsyncRead for StallingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        if self.sent {
            return Poll::Pending;
        }
        self.sent = true;
        buf.put_slice(b"\x00\x00\x00\x18ftypmp42 partial");
        Poll::Ready(Ok(()))
    }
}

/// Returns fixed geometry, or a parse error when built with `None`.
pub(crate) struct FakeProber {
    geometry: Option<StreamGeometry>,
    calls: AtomicUsize,
}

impl FakeProber {
    pub(crate) fn new(geometry: Option<StreamGeometry>) -> Self {
        Self {
            geometry,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoProber for FakeProber {
    async fn probe(&self, path: &Path) -> Result<StreamGeometry, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(path.exists(), "probe called on a missing staged file");
        self.geometry
            .ok_or_else(|| ProbeError::Parse("No streams found".to_string()))
    }
}

pub(crate) struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// In-memory object store that records uploads and counts presign calls.
pub(crate) struct RecordingStorage {
    objects: Mutex<Vec<StoredObject>>,
    fail_uploads: AtomicBool,
    fail_signing: AtomicBool,
    presign_calls: AtomicUsize,
}

impl Default for RecordingStorage {
    fn default() -> Self {
        Self {
            objects: Mutex::new(Vec::new()),
            fail_uploads: AtomicBool::new(false),
            fail_signing: AtomicBool::new(false),
            presign_calls: AtomicUsize::new(0),
        }
    }
}

impl RecordingStorage {
    pub(crate) fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_signing(&self) {
        self.fail_signing.store(true, Ordering::SeqCst);
    }

    pub(crate) fn presign_calls(&self) -> usize {
        self.presign_calls.load(Ordering::SeqCst)
    }

    pub(crate) async fn uploads(&self) -> tokio::sync::MutexGuard<'_, Vec<StoredObject>> {
        self.objects.lock().await
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    fn bucket(&self) -> &str {
        "tubely-test"
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("https://storage.test/{}/{}", self.bucket(), storage_key)
    }

    async fn upload_stream(
        &self,
        storage_key: &str,
        content_type: &str,
        _content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("bucket unavailable".to_string()));
        }

        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        self.objects.lock().await.push(StoredObject {
            key: storage_key.to_string(),
            content_type: content_type.to_string(),
            data,
        });
        Ok(self.public_url(storage_key))
    }

    async fn get_presigned_url(
        &self,
        bucket: &str,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let n = self.presign_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_signing.load(Ordering::SeqCst) {
            return Err(StorageError::SigningFailed("no credentials".to_string()));
        }
        Ok(format!(
            "https://storage.test/{}/{}?expires_in={}&n={}",
            bucket,
            storage_key,
            expires_in.as_secs(),
            n
        ))
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<StorageStream> {
        let objects = self.objects.lock().await;
        let object = objects
            .iter()
            .find(|o| o.key == storage_key)
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))?;
        let chunk = Bytes::copy_from_slice(&object.data);
        Ok(Box::pin(stream::iter(vec![Ok(chunk)])))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// In-memory repository whose updates can be made to fail.
#[derive(Default)]
pub(crate) struct FlakyRepository {
    pub inner: InMemoryVideoRepository,
    fail_updates: AtomicBool,
    update_calls: AtomicUsize,
}

impl FlakyRepository {
    pub(crate) fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    pub(crate) fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoRepository for FlakyRepository {
    async fn create_video(
        &self,
        user_id: Uuid,
        params: CreateVideoParams,
    ) -> RepositoryResult<Video> {
        self.inner.create_video(user_id, params).await
    }

    async fn get_video(&self, id: Uuid) -> RepositoryResult<Option<Video>> {
        self.inner.get_video(id).await
    }

    async fn update_video(&self, video: &Video) -> RepositoryResult<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(RepositoryError::Backend("connection refused".to_string()));
        }
        self.inner.update_video(video).await
    }
}

/// An ingest service wired to fakes.
pub(crate) struct Harness {
    pub service: VideoIngestService,
    pub repository: Arc<FlakyRepository>,
    pub storage: Arc<RecordingStorage>,
    pub prober: Arc<FakeProber>,
    config: IngestConfig,
}

impl Harness {
    pub(crate) async fn new(staging_dir: &Path, mode: PlaybackUrlMode) -> Self {
        Self::with_geometry(
            staging_dir,
            mode,
            StreamGeometry {
                width: 1920,
                height: 1080,
            },
        )
        .await
    }

    pub(crate) async fn with_geometry(
        staging_dir: &Path,
        mode: PlaybackUrlMode,
        geometry: StreamGeometry,
    ) -> Self {
        Self::build(staging_dir, mode, Some(geometry))
    }

    pub(crate) async fn failing_probe(staging_dir: &Path) -> Self {
        Self::build(staging_dir, PlaybackUrlMode::Signed, None)
    }

    fn build(staging_dir: &Path, mode: PlaybackUrlMode, geometry: Option<StreamGeometry>) -> Self {
        let config = IngestConfig {
            staging_dir: staging_dir.to_path_buf(),
            max_upload_size_bytes: 1 << 20,
            store_upload_timeout: Duration::from_secs(5),
            playback_url_mode: mode,
        };
        let repository = Arc::new(FlakyRepository::default());
        let storage = Arc::new(RecordingStorage::default());
        let prober = Arc::new(FakeProber::new(geometry));
        let service = VideoIngestService::new(
            repository.clone(),
            storage.clone(),
            prober.clone(),
            config.clone(),
        );
        Self {
            service,
            repository,
            storage,
            prober,
            config,
        }
    }

    /// Rebuild the service with a different upload cap, keeping the same fakes.
    pub(crate) fn with_limit(mut self, max_upload_size_bytes: u64) -> Self {
        self.config.max_upload_size_bytes = max_upload_size_bytes;
        self.service = VideoIngestService::new(
            self.repository.clone(),
            self.storage.clone(),
            self.prober.clone(),
            self.config.clone(),
        );
        self
    }

    pub(crate) async fn seed_video(&self) -> Video {
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Boots".to_string(),
            description: "A pair of boots".to_string(),
            video_url: None,
            created_at: now,
            updated_at: now,
        };
        self.repository.inner.insert(video.clone()).await;
        video
    }

    /// The stored record still matches the seeded one.
    pub(crate) async fn unchanged(&self, video: &Video) -> bool {
        self.repository
            .get_video(video.id)
            .await
            .ok()
            .flatten()
            .as_ref()
            == Some(video)
    }
}
