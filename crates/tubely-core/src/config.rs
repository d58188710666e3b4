//! Configuration module
//!
//! Server, storage and pipeline settings, read from the environment (and `.env`).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::DEFAULT_MAX_UPLOAD_SIZE_BYTES;
use crate::storage_types::{PlaybackUrlMode, StorageBackend};

const DEFAULT_PORT: u16 = 8091;
const PROBE_TIMEOUT_SECS: u64 = 60;
const STORE_UPLOAD_TIMEOUT_SECS: u64 = 3600;
const MIN_JWT_SECRET_LEN: usize = 32;
const DEFAULT_LOCAL_BUCKET: &str = "tubely-local";

/// Log output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub jwt_secret: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub local_storage_bucket: String,
    // Pipeline configuration
    pub ffprobe_path: String,
    pub probe_timeout_secs: u64,
    pub store_upload_timeout_secs: u64,
    pub max_upload_size_bytes: u64,
    pub staging_dir: Option<PathBuf>,
    pub playback_url_mode: PlaybackUrlMode,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::S3,
        };

        let playback_url_mode = match lookup("PLAYBACK_URL_MODE") {
            Some(value) => value.parse()?,
            None => PlaybackUrlMode::default(),
        };

        let log_format = match lookup("LOG_FORMAT").map(|s| s.to_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let max_upload_size_bytes = match lookup("MAX_UPLOAD_SIZE_GB") {
            Some(value) => parse_number("MAX_UPLOAD_SIZE_GB", &value)?
                .checked_mul(1 << 30)
                .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_GB is too large"))?,
            None => DEFAULT_MAX_UPLOAD_SIZE_BYTES,
        };

        Ok(Config {
            server_port: lookup("PORT")
                .unwrap_or_else(|| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            jwt_secret: lookup("JWT_SECRET")
                .ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            storage_backend,
            s3_bucket: lookup("S3_BUCKET"),
            s3_region: lookup("S3_REGION"),
            s3_endpoint: lookup("S3_ENDPOINT"),
            aws_region: lookup("AWS_REGION"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL"),
            local_storage_bucket: lookup("LOCAL_STORAGE_BUCKET")
                .unwrap_or_else(|| DEFAULT_LOCAL_BUCKET.to_string()),
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            probe_timeout_secs: lookup("PROBE_TIMEOUT_SECS")
                .map(|s| parse_number("PROBE_TIMEOUT_SECS", &s))
                .transpose()?
                .unwrap_or(PROBE_TIMEOUT_SECS),
            store_upload_timeout_secs: lookup("STORE_UPLOAD_TIMEOUT_SECS")
                .map(|s| parse_number("STORE_UPLOAD_TIMEOUT_SECS", &s))
                .transpose()?
                .unwrap_or(STORE_UPLOAD_TIMEOUT_SECS),
            max_upload_size_bytes,
            staging_dir: lookup("STAGING_DIR").map(PathBuf::from),
            playback_url_mode,
            log_format,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if self.probe_timeout_secs == 0 || self.store_upload_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "PROBE_TIMEOUT_SECS and STORE_UPLOAD_TIMEOUT_SECS must be positive"
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_GB must be positive"));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Region for the S3 backend, preferring `S3_REGION` over `AWS_REGION`.
    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn store_upload_timeout(&self) -> Duration {
        Duration::from_secs(self.store_upload_timeout_secs)
    }

    /// Directory for staged uploads, falling back to the system temp dir.
    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(env::temp_dir)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, anyhow::Error> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{} must be a valid number", key))
}
