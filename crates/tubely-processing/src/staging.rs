//! Staging store for inbound uploads
//!
//! The probe needs a seekable local file and the HTTP body is a one-shot stream, so every
//! upload is first copied into a temporary file. A [`StagedUpload`] owns that file; dropping
//! it closes and deletes it, which covers early returns, errors and cancelled requests.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tubely_core::constants::STAGING_FILE_PREFIX;
use tubely_core::AppError;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Upload exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("Staging I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StagingError> for AppError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            StagingError::Io(e) => AppError::Internal(format!("Failed to stage upload: {}", e)),
        }
    }
}

/// Media type essence: parameters stripped, trimmed and lowercased.
pub fn normalize_media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Creates staged files in one directory with a size cap.
#[derive(Debug, Clone)]
pub struct StagingStore {
    dir: PathBuf,
    max_bytes: u64,
}

impl StagingStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    /// Copy `reader` to a new staged file and rewind it.
    ///
    /// Reads at most one byte past the cap; a body over the cap is rejected and its partial
    /// file removed.
    pub async fn stage<R>(&self, extension: &str, reader: R) -> Result<StagedUpload, StagingError>
    where
        R: AsyncRead + Unpin,
    {
        tokio::fs::create_dir_all(&self.dir).await?;

        let suffix = format!(".{}", extension);
        let temp = tempfile::Builder::new()
            .prefix(STAGING_FILE_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;
        let mut file = File::from_std(temp.reopen()?);

        let mut limited = reader.take(self.max_bytes.saturating_add(1));
        let size = tokio::io::copy(&mut limited, &mut file).await?;

        if size > self.max_bytes {
            return Err(StagingError::TooLarge {
                limit: self.max_bytes,
            });
        }

        file.flush().await?;
        file.seek(SeekFrom::Start(0)).await?;

        tracing::debug!(
            path = %temp.path().display(),
            size_bytes = size,
            "Upload staged"
        );

        Ok(StagedUpload { temp, file, size })
    }
}

/// A fully written upload on local disk, deleted on drop.
#[derive(Debug)]
pub struct StagedUpload {
    temp: NamedTempFile,
    file: File,
    size: u64,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// A reader over the staged bytes from byte zero. It shares the staged file's handle,
    /// so the file must stay alive until the reader is done.
    pub async fn reader(&mut self) -> Result<File, StagingError> {
        self.file.seek(SeekFrom::Start(0)).await?;
        Ok(self.file.try_clone().await?)
    }
}
