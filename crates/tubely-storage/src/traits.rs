//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;
use tubely_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Byte stream returned by downloads
pub type StorageStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UploadFailed(msg) => AppError::StoreWrite(msg),
            StorageError::SigningFailed(msg) => AppError::Signing(msg),
            StorageError::NotFound(key) => AppError::NotFound(format!("Object {} not found", key)),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::InvalidSignature(msg) => AppError::Authorization(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait so the ingestion
/// pipeline works with any backend without coupling to implementation details.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Bucket that uploads are written to
    fn bucket(&self) -> &str;

    /// Canonical (unsigned) URL of an object in this gateway's bucket
    fn public_url(&self, storage_key: &str) -> String;

    /// Upload a file from a stream/reader into this gateway's bucket.
    ///
    /// The reader is consumed until EOF without buffering the whole object in memory.
    /// On failure nothing is left addressable under `storage_key`.
    ///
    /// # Returns
    /// The canonical URL of the stored object
    async fn upload_stream(
        &self,
        storage_key: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String>;

    /// Generate a presigned URL authorizing anonymous GET of `bucket/storage_key` until
    /// `expires_in` has elapsed.
    async fn get_presigned_url(
        &self,
        bucket: &str,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Check a retrieval signature produced by [`Storage::get_presigned_url`].
    ///
    /// Only backends that serve their own objects verify signatures; others return a
    /// `ConfigError`.
    fn verify_retrieval_signature(
        &self,
        _bucket: &str,
        _storage_key: &str,
        _expires: u64,
        _signature: &str,
    ) -> StorageResult<()> {
        Err(StorageError::ConfigError(format!(
            "{} backend does not verify retrieval signatures",
            self.backend_type()
        )))
    }

    /// Download a file as a stream
    async fn download_stream(&self, storage_key: &str) -> StorageResult<StorageStream>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
