//! Pipeline constants shared by the ingestion and delivery paths.

use std::time::Duration;

/// The only media type accepted by the upload path.
pub const ACCEPTED_VIDEO_MEDIA_TYPE: &str = "video/mp4";

/// Validity of a signed retrieval URL.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(60 * 60);

/// Default cap on a single upload body (30 GiB).
pub const DEFAULT_MAX_UPLOAD_SIZE_BYTES: u64 = 30 << 30;

/// Separator between bucket and key in a persisted storage reference.
pub const REFERENCE_DELIMITER: char = ',';

/// Prefix of staged upload files.
pub const STAGING_FILE_PREFIX: &str = "tubely-upload";

/// Random bytes behind each stored object's filename.
pub const OBJECT_NAME_RANDOM_BYTES: usize = 32;
