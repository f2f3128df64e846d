//! An HTTP service with deferred request logging.
//!
//! Features:
//! - One request log line per request, emitted after the response is sent
//! - Text or JSON rendering of the log line
//! - Optional static file serving for unmatched paths

use anyhow::Context;
use request_log::{
    app,
    cli::Cli,
    sink::{LogSink, TracingSink},
    state::AppState,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{Level, info};

/// Main entry point that configures and runs the server
///
/// Sets up:
/// - Structured logging
/// - The request log sink
/// - Routes with the request logging middleware
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Cli = argh::from_env();

    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_ansi(!args.no_color)
        .init();

    let static_dir = args
        .static_dir
        .map(|dir| {
            dir.canonicalize()
                .with_context(|| format!("failed to canonicalize static directory {:?}", dir))
        })
        .transpose()?;

    let sink: Arc<dyn LogSink> = Arc::new(TracingSink::new(args.log_format));
    let state = Arc::new(AppState {
        sink,
        static_dir: static_dir.clone(),
    });

    let app = app::router(state);

    if let Some(dir) = &static_dir {
        info!("Serving static files from: {:?}", dir);
    }
    info!("Request log format: {}", args.log_format);
    info!("Server running on: http://{}", args.bind);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}
