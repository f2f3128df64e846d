//! Request-log library - deferred, non-blocking request logging for axum services.

pub mod app;
pub mod cli;
pub mod handlers;
pub mod middleware;
pub mod record;
pub mod recorder;
pub mod sink;
pub mod state;
pub mod tasks;
