//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use tubely_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video ingestion API (v0): create drafts, upload mp4 files and fetch playable URLs."
    ),
    paths(
        handlers::videos::create_video,
        handlers::videos::get_video,
        handlers::video_upload::upload_video,
    ),
    components(schemas(
        models::Video,
        models::CreateVideoParams,
        models::Orientation,
        error::ErrorResponse,
    )),
    tags(
        (name = "videos", description = "Video drafts, uploads and playback URLs")
    )
)]
pub struct ApiDoc;
