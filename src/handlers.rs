//! HTTP request handlers.

use axum::{
    body::{Body, Bytes},
    extract::{Extension, State},
    http::{HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

use crate::{recorder::record_request, state::AppState, tasks::BackgroundTasks};

/// Liveness probe
pub async fn health() -> &'static str {
    "ok"
}

/// Accepts any payload and acknowledges its size
pub async fn submit(body: Bytes) -> impl IntoResponse {
    (
        StatusCode::ACCEPTED,
        format!("received {} bytes", body.len()),
    )
}

/// Schedules a context-free log action next to the request's own log line
pub async fn heartbeat(
    State(state): State<Arc<AppState>>,
    Extension(tasks): Extension<BackgroundTasks>,
) -> &'static str {
    record_request(&tasks, None, state.sink.clone());
    "scheduled"
}

/// Handles static file requests with proper content-type detection
///
/// Implements several key behaviors:
/// - Automatic index.html serving for directory requests
/// - Correct MIME type detection using file extension
/// - 404 for everything when no static directory is configured
pub async fn serve_static(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Response, StatusCode> {
    let Some(static_dir) = state.static_dir.as_ref() else {
        return Err(StatusCode::NOT_FOUND);
    };

    let path = uri.path().trim_start_matches('/');
    if path.split('/').any(|segment| segment == "..") {
        return Err(StatusCode::NOT_FOUND);
    }

    let mut file_path = static_dir.join(path);
    if file_path.is_dir() {
        file_path.push("index.html");
    }

    let content = fs::read(&file_path).await.map_err(|err| {
        debug!("static file {:?} unavailable: {}", file_path, err);
        StatusCode::NOT_FOUND
    })?;

    let mime_type = mime_guess::from_path(&file_path).first_or_octet_stream();
    let content_type =
        HeaderValue::from_str(mime_type.as_ref()).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut response = Response::new(Body::from(content));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, content_type);
    Ok(response)
}
