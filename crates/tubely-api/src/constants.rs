pub const API_PREFIX: &str = "/api/v0";

/// Path of the local backend's asset route. `LOCAL_STORAGE_BASE_URL` should end with it.
pub const ASSETS_PREFIX: &str = "/assets";

/// Multipart field carrying the video file.
pub const VIDEO_UPLOAD_FIELD: &str = "video";

/// Room left above the upload cap for multipart boundaries, part headers and small fields.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;
