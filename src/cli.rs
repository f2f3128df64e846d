//! Command-line interface configuration.

use argh::FromArgs;
use std::{net::SocketAddr, path::PathBuf};

use crate::sink::LogFormat;

/// An HTTP service that logs every request after its response is sent
#[derive(Debug, FromArgs)]
pub struct Cli {
    /// server bind address (default: '127.0.0.1:8000')
    #[argh(option, default = "\"127.0.0.1:8000\".parse().unwrap()")]
    pub bind: SocketAddr,

    /// optional static files directory served for unmatched GET paths (e.g. 'dist/')
    #[argh(option, long = "static-dir")]
    pub static_dir: Option<PathBuf>,

    /// request log line format, 'text' or 'json' (default: 'text')
    #[argh(option, long = "log-format", default = "LogFormat::Text")]
    pub log_format: LogFormat,

    /// disable ANSI colors in log output
    #[argh(switch, long = "no-color")]
    pub no_color: bool,
}
