//! Router assembly.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{handlers, middleware::log_requests, state::AppState};

/// Builds the service router with request logging applied to every route,
/// the fallback included
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/submit", post(handlers::submit))
        .route("/heartbeat", get(handlers::heartbeat))
        .fallback(get(handlers::serve_static))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}
