//! Video draft creation and retrieval.

use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tubely_core::models::{CreateVideoParams, Video};
use tubely_core::AppError;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v0/videos",
    tag = "videos",
    request_body = CreateVideoParams,
    responses(
        (status = 201, description = "Video draft created", body = Video),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn create_video(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ValidatedJson(params): ValidatedJson<CreateVideoParams>,
) -> Result<(StatusCode, Json<Video>), HttpAppError> {
    if params.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title must not be empty".to_string()).into());
    }

    let video = state.videos.create_video(auth.user_id, params).await?;

    tracing::info!(video_id = %video.id, user_id = %auth.user_id, "Video draft created");

    Ok((StatusCode::CREATED, Json(video)))
}

#[utoipa::path(
    get,
    path = "/api/v0/videos/{video_id}",
    tag = "videos",
    params(("video_id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video with a playable URL", body = Video),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(video_id): Path<String>,
) -> Result<Json<Video>, HttpAppError> {
    let video_id = Uuid::parse_str(&video_id)?;

    let video = state
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

    if video.user_id != auth.user_id {
        return Err(AppError::Authorization(
            "User is not the owner of this video".to_string(),
        )
        .into());
    }

    let video = state.signer.signed_view(video).await?;
    Ok(Json(video))
}
