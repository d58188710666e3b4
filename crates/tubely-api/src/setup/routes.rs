//! Route setup and configuration

use crate::api_doc::ApiDoc;
use crate::auth::{auth_middleware, AuthState};
use crate::constants::{API_PREFIX, ASSETS_PREFIX, MULTIPART_OVERHEAD_BYTES};
use crate::error::HttpAppError;
use crate::handlers;
use crate::state::AppState;
use axum::{
    body::{Body, Bytes, HttpBody},
    extract::DefaultBodyLimit,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    BoxError, Json, Router,
};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub fn setup_routes(state: Arc<AppState>) -> Router {
    let auth_state = AuthState {
        authenticator: state.authenticator.clone(),
    };

    let protected_routes = video_routes(state.config.max_upload_size_bytes).layer(
        axum::middleware::from_fn_with_state(Arc::new(auth_state), auth_middleware),
    );

    public_routes()
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            &format!("{}/openapi.json", API_PREFIX),
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .route(
            &format!("{}/{{bucket}}/{{*key}}", ASSETS_PREFIX),
            get(handlers::assets::serve_asset),
        )
}

fn video_routes(max_upload_size_bytes: u64) -> Router<Arc<AppState>> {
    let upload_body_limit =
        usize::try_from(max_upload_size_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES))
            .unwrap_or(usize::MAX);

    Router::new()
        .route(
            &format!("{}/videos", API_PREFIX),
            post(handlers::videos::create_video),
        )
        .route(
            &format!("{}/videos/{{video_id}}", API_PREFIX),
            get(handlers::videos::get_video),
        )
        // The whole request is bounded here; the staging cap bounds the video field itself.
        .route(
            &format!("{}/video_upload/{{video_id}}", API_PREFIX),
            post(handlers::video_upload::upload_video)
                .layer::<_, Infallible>(DefaultBodyLimit::disable())
                .layer::<_, Infallible>(RequestBodyLimitLayer::new(upload_body_limit))
                .layer(axum::middleware::map_response(
                    render_body_limit_rejection::<Body>,
                )),
        )
}

/// The body limit layer answers an oversized `Content-Length` with a plain-text 413
/// before the handler runs. Give it the same JSON body as every other error.
async fn render_body_limit_rejection<B>(response: Response<B>) -> Response
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return HttpAppError(handlers::video_upload::body_too_large()).into_response();
    }
    response.into_response()
}
