use crate::auth::AuthContext;
use crate::constants::VIDEO_UPLOAD_FIELD;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use futures::TryStreamExt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::io::StreamReader;
use tubely_core::models::Video;
use tubely_core::AppError;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v0/video_upload/{video_id}",
    tag = "videos",
    params(("video_id" = Uuid, Path, description = "Video ID")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video uploaded and attached", body = Video),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Not a video/mp4 upload", body = ErrorResponse),
        (status = 422, description = "No readable video stream", body = ErrorResponse),
        (status = 502, description = "Object store write failed", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Video>, HttpAppError> {
    let video_id = Uuid::parse_str(&video_id)?;

    // Stream the first `video` field straight into the pipeline; earlier fields are skipped.
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(VIDEO_UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        tracing::debug!(
            video_id = %video_id,
            file_name = ?field.file_name(),
            content_type = %content_type,
            "Receiving video upload"
        );

        let body_limit_hit = AtomicBool::new(false);
        let body = StreamReader::new(Box::pin(field.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                body_limit_hit.store(true, Ordering::Relaxed);
            }
            io::Error::other(e)
        })));
        let video = match state
            .ingest
            .ingest(video_id, auth.user_id, &content_type, body)
            .await
        {
            // The request limit tripped mid-field; staging only saw an I/O error.
            Err(_) if body_limit_hit.load(Ordering::Relaxed) => {
                return Err(body_too_large().into())
            }
            result => result?,
        };

        let video = state.signer.signed_view(video).await?;
        return Ok(Json(video));
    }

    Err(AppError::InvalidInput(format!(
        "Missing '{}' field in multipart form",
        VIDEO_UPLOAD_FIELD
    ))
    .into())
}

pub(crate) fn body_too_large() -> AppError {
    AppError::PayloadTooLarge("Request body exceeds the upload size limit".to_string())
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return body_too_large();
    }
    AppError::InvalidInput(format!("Failed to read multipart: {}", err))
}
