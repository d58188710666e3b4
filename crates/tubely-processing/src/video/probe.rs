//! Stream geometry extraction with `ffprobe`

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tubely_core::models::StreamGeometry;
use tubely_core::AppError;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Invalid ffprobe path: {0}")]
    InvalidExecutable(String),

    #[error("ffprobe execution failed: {0}")]
    Execution(String),

    #[error("ffprobe timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to parse ffprobe output: {0}")]
    Parse(String),
}

impl From<ProbeError> for AppError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::Execution(_) | ProbeError::Timeout(_) => {
                AppError::ProbeExecution(err.to_string())
            }
            ProbeError::Parse(msg) => AppError::ProbeParse(msg),
            ProbeError::InvalidExecutable(msg) => AppError::Internal(msg),
        }
    }
}

/// Extracts stream geometry from a fully written local media file.
#[async_trait]
pub trait VideoProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<StreamGeometry, ProbeError>;
}

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences
fn validate_path(path: &str) -> Result<(), ProbeError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ProbeError::InvalidExecutable(format!(
            "Path contains dangerous characters: {}",
            path
        )));
    }

    if path.contains("..") {
        return Err(ProbeError::InvalidExecutable(format!(
            "Path contains directory traversal: {}",
            path
        )));
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Parse `ffprobe -print_format json -show_streams` output into the first stream's geometry.
pub fn parse_probe_output(stdout: &[u8]) -> Result<StreamGeometry, ProbeError> {
    let output: ProbeOutput =
        serde_json::from_slice(stdout).map_err(|e| ProbeError::Parse(e.to_string()))?;

    let stream = output
        .streams
        .first()
        .ok_or_else(|| ProbeError::Parse("No streams found".to_string()))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(width), Some(height)) => (width, height),
        _ => {
            return Err(ProbeError::Parse(
                "First stream has no width/height".to_string(),
            ))
        }
    };

    if height == 0 {
        return Err(ProbeError::Parse("First stream has zero height".to_string()));
    }

    Ok(StreamGeometry { width, height })
}

/// Runs the `ffprobe` executable as a child process.
pub struct FfprobeProber {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: String, timeout: Duration) -> Result<Self, ProbeError> {
        validate_path(&ffprobe_path)?;

        if !ffprobe_path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        }) {
            return Err(ProbeError::InvalidExecutable(
                "ffprobe path contains unsafe characters".to_string(),
            ));
        }

        Ok(Self {
            ffprobe_path,
            timeout,
        })
    }
}

#[async_trait]
impl VideoProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        process.command = "ffprobe",
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> Result<StreamGeometry, ProbeError> {
        let start = std::time::Instant::now();

        // The child is killed if the output future is dropped on timeout.
        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
            .map_err(|e| ProbeError::Execution(format!("Failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(ProbeError::Execution(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let geometry = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width = geometry.width,
            height = geometry.height,
            "Video probe completed"
        );

        Ok(geometry)
    }
}
