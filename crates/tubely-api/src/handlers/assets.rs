//! Retrieval route for objects held by the local storage backend.
//!
//! In signed playback mode the URL must carry the `expires` and `signature` pair produced by
//! the backend's presigner. In public mode objects of the configured bucket are served as is.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tubely_core::{AppError, PlaybackUrlMode, StorageBackend};

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: Option<u64>,
    pub signature: Option<String>,
}

fn content_type_for_key(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

pub async fn serve_asset(
    State(state): State<Arc<AppState>>,
    Path((bucket, key)): Path<(String, String)>,
    Query(query): Query<SignedQuery>,
) -> Result<Response, HttpAppError> {
    if state.storage.backend_type() != StorageBackend::Local {
        return Err(AppError::NotFound(
            "Asset route is only served by the local backend".to_string(),
        )
        .into());
    }

    match state.config.playback_url_mode {
        PlaybackUrlMode::Signed => {
            let (Some(expires), Some(signature)) = (query.expires, query.signature.as_deref())
            else {
                return Err(AppError::Authorization("Missing URL signature".to_string()).into());
            };
            state
                .storage
                .verify_retrieval_signature(&bucket, &key, expires, signature)?;
        }
        PlaybackUrlMode::Public => {
            if bucket != state.storage.bucket() {
                return Err(AppError::NotFound(format!("{}/{}", bucket, key)).into());
            }
        }
    }

    let stream = state.storage.download_stream(&key).await?;

    tracing::debug!(bucket = %bucket, storage_key = %key, "Serving asset");

    Ok((
        [(header::CONTENT_TYPE, content_type_for_key(&key))],
        Body::from_stream(stream),
    )
        .into_response())
}
