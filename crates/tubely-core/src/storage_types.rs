use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Defined in core because configuration selects it and the storage factory consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

/// How a stored video is referenced from its record.
///
/// `Signed` persists `bucket,key` and signs a retrieval URL on every read.
/// `Public` persists the canonical object URL and never signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackUrlMode {
    #[default]
    Signed,
    Public,
}

impl FromStr for PlaybackUrlMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "signed" => Ok(PlaybackUrlMode::Signed),
            "public" => Ok(PlaybackUrlMode::Public),
            _ => Err(anyhow::anyhow!("Invalid playback URL mode: {}", s)),
        }
    }
}

impl Display for PlaybackUrlMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PlaybackUrlMode::Signed => write!(f, "signed"),
            PlaybackUrlMode::Public => write!(f, "public"),
        }
    }
}
