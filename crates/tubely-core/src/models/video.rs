use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::REFERENCE_DELIMITER;
use crate::error::AppError;

/// A video record. `video_url` holds either a `bucket,key` storage reference, a
/// signed retrieval URL or a public object URL depending on the playback mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateVideoParams {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Coarse orientation of a video, used as the storage key prefix.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Orientation::Landscape => write!(f, "landscape"),
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Other => write!(f, "other"),
        }
    }
}

/// Width and height of the first stream reported by the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamGeometry {
    pub width: u32,
    pub height: u32,
}

/// Bucket and key of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageReference {
    pub bucket: String,
    pub key: String,
}

impl StorageReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Serialize as `bucket,key`.
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.bucket, REFERENCE_DELIMITER, self.key)
    }

    /// Parse a persisted `bucket,key` reference. Anything other than exactly two
    /// parts is malformed.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let parts: Vec<&str> = value.split(REFERENCE_DELIMITER).collect();
        match parts.as_slice() {
            [bucket, key] => Ok(Self::new(*bucket, *key)),
            _ => Err(AppError::MalformedReference(format!(
                "expected bucket{}key, got {} part(s)",
                REFERENCE_DELIMITER,
                parts.len()
            ))),
        }
    }
}

impl Display for StorageReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.encode())
    }
}
