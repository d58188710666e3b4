//! Shared key generation for storage backends.
//!
//! Key format: `{orientation}/{name}.{ext}`.

use base64::Engine;
use rand::RngCore;
use tubely_core::constants::OBJECT_NAME_RANDOM_BYTES;
use tubely_core::models::Orientation;

use crate::traits::{StorageError, StorageResult};

/// File extension for a media type: the subtype after `/`, parameters stripped.
pub fn extension_for_media_type(media_type: &str) -> StorageResult<&str> {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    match essence.split_once('/') {
        Some((_, subtype)) if !subtype.is_empty() && !subtype.contains('/') => Ok(subtype),
        _ => Err(StorageError::InvalidKey(format!(
            "Cannot derive a file extension from media type '{}'",
            media_type
        ))),
    }
}

/// Random object name: 32 CSPRNG bytes as unpadded base64url, plus `.{ext}`.
pub fn generate_object_name(extension: &str) -> String {
    let mut bytes = [0u8; OBJECT_NAME_RANDOM_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    let name = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);
    format!("{}.{}", name, extension)
}

/// Generate the storage key for a classified video of the given media type.
pub fn generate_video_key(orientation: Orientation, media_type: &str) -> StorageResult<String> {
    let extension = extension_for_media_type(media_type)?;
    Ok(format!(
        "{}/{}",
        orientation,
        generate_object_name(&extension.to_lowercase())
    ))
}

/// Reject keys that could escape a backend's namespace.
pub fn validate_storage_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
