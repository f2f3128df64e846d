//! Shared application state.

use std::{path::PathBuf, sync::Arc};

use crate::sink::LogSink;

/// Shared application state accessible to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Destination of every deferred request log line
    pub sink: Arc<dyn LogSink>,
    /// Root directory for static file serving, if enabled
    pub static_dir: Option<PathBuf>,
}
