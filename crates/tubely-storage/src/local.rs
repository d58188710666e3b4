use crate::keys::validate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult, StorageStream};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::StreamExt;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio_util::io::ReaderStream;

type HmacSha256 = Hmac<Sha256>;

/// Local filesystem storage implementation
///
/// Objects live at `{base_path}/{bucket}/{key}`. Retrieval URLs point at the asset route
/// and carry an expiry plus an HMAC-SHA256 signature over `bucket`, `key` and the expiry.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    bucket: String,
    signing_secret: Vec<u8>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/tubely/media")
    /// * `base_url` - Base URL of the asset route (e.g., "http://localhost:8091/assets")
    /// * `bucket` - Bucket name; the first directory level under `base_path`
    /// * `signing_secret` - Key for retrieval URL signatures
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        bucket: String,
        signing_secret: impl Into<Vec<u8>>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();
        let bucket_path = base_path.join(&bucket);

        fs::create_dir_all(&bucket_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                bucket_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            bucket,
            signing_secret: signing_secret.into(),
        })
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_storage_key(storage_key)?;
        Ok(self.base_path.join(&self.bucket).join(storage_key))
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(bucket),
            encoded_key
        )
    }

    fn mac(&self, bucket: &str, key: &str, expires: u64) -> StorageResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_secret)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        mac.update(bucket.as_bytes());
        mac.update(b"\n");
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn write_partial(
        path: &Path,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<u64> {
        let mut file = fs::File::create(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let size = tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.flush().await?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(size)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[async_trait]
impl Storage for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn public_url(&self, storage_key: &str) -> String {
        self.object_url(&self.bucket, storage_key)
    }

    async fn upload_stream(
        &self,
        storage_key: &str,
        _content_type: &str,
        _content_length: Option<u64>,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        self.ensure_parent_dir(&path).await?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| StorageError::InvalidKey(storage_key.to_string()))?;
        let partial_path = path.with_file_name(format!("{}.partial", file_name));

        let start = std::time::Instant::now();

        let size = match Self::write_partial(&partial_path, reader).await {
            Ok(size) => size,
            Err(e) => {
                let _ = fs::remove_file(&partial_path).await;
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage upload failed"
                );
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&partial_path, &path).await {
            let _ = fs::remove_file(&partial_path).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to publish file {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(self.public_url(storage_key))
    }

    async fn get_presigned_url(
        &self,
        bucket: &str,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_storage_key(storage_key)?;

        let expires = unix_now() + expires_in.as_secs();
        let signature = hex::encode(
            self.mac(bucket, storage_key, expires)?
                .finalize()
                .into_bytes(),
        );

        Ok(format!(
            "{}?expires={}&signature={}",
            self.object_url(bucket, storage_key),
            expires,
            signature
        ))
    }

    fn verify_retrieval_signature(
        &self,
        bucket: &str,
        storage_key: &str,
        expires: u64,
        signature: &str,
    ) -> StorageResult<()> {
        let tag = hex::decode(signature)
            .map_err(|_| StorageError::InvalidSignature("Signature is not hex".to_string()))?;

        self.mac(bucket, storage_key, expires)?
            .verify_slice(&tag)
            .map_err(|_| StorageError::InvalidSignature("Signature mismatch".to_string()))?;

        if unix_now() > expires {
            return Err(StorageError::InvalidSignature(
                "Signed URL has expired".to_string(),
            ));
        }

        if bucket != self.bucket {
            return Err(StorageError::NotFound(format!("{}/{}", bucket, storage_key)));
        }

        Ok(())
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<StorageStream> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let file = fs::File::open(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            key = %storage_key,
            "Local storage stream download started"
        );

        let stream = ReaderStream::new(file).map(|chunk| chunk.map_err(StorageError::from));
        Ok(Box::pin(stream))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
