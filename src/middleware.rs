//! Request logging middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::{
    record::RequestSnapshot, recorder::record_request, state::AppState, tasks::BackgroundTasks,
};

/// Middleware that schedules one request log line per request
///
/// This middleware:
/// 1. Creates the request's background task registry
/// 2. Snapshots method, path and peer address
/// 3. Registers the deferred log action, without emitting anything yet
/// 4. Stores the registry in request extensions so handlers can add their own tasks
/// 5. Releases the registry once the response body has been handed off
pub async fn log_requests(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let tasks = BackgroundTasks::new();
    let snapshot = RequestSnapshot::from_request(&req);

    record_request(&tasks, Some(snapshot), state.sink.clone());
    req.extensions_mut().insert(tasks.clone());

    let response = next.run(req).await;
    tasks.attach(response)
}
