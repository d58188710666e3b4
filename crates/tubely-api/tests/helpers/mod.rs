//! Test helpers: build the app on the local storage backend with a fake prober.
//!
//! Run from workspace root: `cargo test -p tubely-api`.

#![allow(dead_code)]

pub mod auth;

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::auth::{Authenticator, JwtAuthenticator};
use tubely_api::setup::{assemble_state, routes};
use tubely_core::models::{StreamGeometry, Video};
use tubely_core::{Config, PlaybackUrlMode};
use tubely_db::InMemoryVideoRepository;
use tubely_processing::{ProbeError, VideoProber};
use tubely_storage::create_storage;
use uuid::Uuid;

use self::auth::{TestUser, TEST_JWT_SECRET};

pub const ASSET_HOST: &str = "http://localhost";
pub const LOCAL_BUCKET: &str = "tubely-local";

/// Returns a fixed geometry, or a parse error when built with `None`.
pub struct FakeProber {
    geometry: Option<StreamGeometry>,
    calls: AtomicUsize,
}

impl FakeProber {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoProber for FakeProber {
    async fn probe(&self, _path: &Path) -> Result<StreamGeometry, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.geometry
            .ok_or_else(|| ProbeError::Parse("No streams found".to_string()))
    }
}

/// Test application: server plus the collaborators tests inspect directly.
pub struct TestApp {
    pub server: TestServer,
    pub videos: Arc<InMemoryVideoRepository>,
    pub prober: Arc<FakeProber>,
    pub storage_dir: TempDir,
    pub staging_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of entries left in the staging directory.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging_dir.path())
            .map(|d| d.count())
            .unwrap_or(0)
    }

    pub fn stored_object(&self, key: &str) -> PathBuf {
        self.storage_dir.path().join(LOCAL_BUCKET).join(key)
    }

    /// Create a draft owned by `user` through the API.
    pub async fn create_video(&self, user: &TestUser) -> Video {
        let response = self
            .server
            .post("/api/v0/videos")
            .add_header("Authorization", user.bearer())
            .json(&serde_json::json!({ "title": "Boots", "description": "A pair of boots" }))
            .await;
        assert_eq!(response.status_code(), 201);
        response.json::<Video>()
    }

    pub async fn upload(
        &self,
        user: &TestUser,
        video_id: Uuid,
        content_type: &str,
        data: &[u8],
    ) -> TestResponse {
        let part = Part::bytes(bytes::Bytes::copy_from_slice(data))
            .file_name("boots.mp4")
            .mime_type(content_type);
        self.upload_form(user, video_id, MultipartForm::new().add_part("video", part))
            .await
    }

    pub async fn upload_form(
        &self,
        user: &TestUser,
        video_id: Uuid,
        form: MultipartForm,
    ) -> TestResponse {
        self.server
            .post(&format!("/api/v0/video_upload/{}", video_id))
            .add_header("Authorization", user.bearer())
            .multipart(form)
            .await
    }
}

/// Path and query of a URL served by the local asset route.
pub fn asset_path(url: &str) -> &str {
    url.strip_prefix(ASSET_HOST)
        .expect("Asset URL should start with the test host")
}

pub fn test_config(storage_dir: &Path, staging_dir: &Path, mode: PlaybackUrlMode) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("JWT_SECRET", TEST_JWT_SECRET.to_string()),
        ("STORAGE_BACKEND", "local".to_string()),
        ("LOCAL_STORAGE_PATH", storage_dir.display().to_string()),
        ("LOCAL_STORAGE_BASE_URL", format!("{}/assets", ASSET_HOST)),
        ("LOCAL_STORAGE_BUCKET", LOCAL_BUCKET.to_string()),
        ("STAGING_DIR", staging_dir.display().to_string()),
        ("PLAYBACK_URL_MODE", mode.to_string()),
        ("MAX_UPLOAD_SIZE_GB", "1".to_string()),
    ]);
    let config = Config::from_lookup(|key| vars.get(key).cloned()).expect("Invalid test config");
    config.validate().expect("Test config failed validation");
    config
}

pub async fn setup_test_app(mode: PlaybackUrlMode) -> TestApp {
    setup_test_app_with_geometry(
        mode,
        Some(StreamGeometry {
            width: 1920,
            height: 1080,
        }),
    )
    .await
}

pub async fn setup_test_app_with_geometry(
    mode: PlaybackUrlMode,
    geometry: Option<StreamGeometry>,
) -> TestApp {
    build_test_app(mode, geometry, None).await
}

/// App whose upload cap is `max_upload_size_bytes` instead of the 1 GiB test default.
pub async fn setup_test_app_with_limit(max_upload_size_bytes: u64) -> TestApp {
    build_test_app(
        PlaybackUrlMode::Signed,
        Some(StreamGeometry {
            width: 1920,
            height: 1080,
        }),
        Some(max_upload_size_bytes),
    )
    .await
}

async fn build_test_app(
    mode: PlaybackUrlMode,
    geometry: Option<StreamGeometry>,
    max_upload_size_bytes: Option<u64>,
) -> TestApp {
    let storage_dir = tempfile::tempdir().expect("Failed to create storage dir");
    let staging_dir = tempfile::tempdir().expect("Failed to create staging dir");
    let mut config = test_config(storage_dir.path(), staging_dir.path(), mode);
    if let Some(limit) = max_upload_size_bytes {
        config.max_upload_size_bytes = limit;
    }

    let storage = create_storage(&config)
        .await
        .expect("Failed to create local storage");
    let videos = Arc::new(InMemoryVideoRepository::new());
    let prober = Arc::new(FakeProber {
        geometry,
        calls: AtomicUsize::new(0),
    });
    let authenticator: Arc<dyn Authenticator> =
        Arc::new(JwtAuthenticator::new(&config.jwt_secret));

    let state = assemble_state(config, videos.clone(), storage, prober.clone(), authenticator);
    let app = routes::setup_routes(Arc::new(state));
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        videos,
        prober,
        storage_dir,
        staging_dir,
    }
}
