//! Where deferred log entries end up.

use std::{fmt, str::FromStr};
use thiserror::Error;
use tracing::{info, warn};

use crate::record::LogEntry;

/// Tracing target every request log line is emitted under
pub const TARGET: &str = "request_log";

/// Destination for log entries produced by deferred log actions
///
/// Built once at startup and shared by reference. Implementations must not
/// panic; failures stay inside the sink.
pub trait LogSink: Send + Sync + 'static {
    fn emit(&self, entry: &LogEntry);
}

/// Rendering used for request log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Error)]
#[error("unknown log format '{0}' (expected 'text' or 'json')")]
pub struct ParseLogFormatError(String);

impl FromStr for LogFormat {
    type Err = ParseLogFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ParseLogFormatError(s.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Emits entries as INFO events through the global `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    format: LogFormat,
}

impl TracingSink {
    pub fn new(format: LogFormat) -> Self {
        Self { format }
    }
}

impl LogSink for TracingSink {
    fn emit(&self, entry: &LogEntry) {
        match self.format {
            LogFormat::Text => info!(target: TARGET, "{entry}"),
            LogFormat::Json => match serde_json::to_string(entry) {
                Ok(line) => info!(target: TARGET, "{line}"),
                Err(err) => {
                    warn!(target: TARGET, error = %err, "falling back to text log line");
                    info!(target: TARGET, "{entry}");
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ClientInfo, RequestSnapshot};
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn emit_captured(sink: TracingSink, entry: &LogEntry) -> String {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || sink.emit(entry));
        String::from_utf8(out.0.lock().unwrap().clone()).unwrap()
    }

    fn health_check() -> RequestSnapshot {
        RequestSnapshot {
            method: "GET".into(),
            path: "/health".into(),
            client: Some(ClientInfo {
                host: "127.0.0.1".into(),
            }),
        }
    }

    #[test]
    fn text_line_is_info_under_request_log_target() {
        let entry = LogEntry::capture(Some(&health_check()));
        let out = emit_captured(TracingSink::default(), &entry);

        assert!(out.contains("INFO"));
        assert!(out.contains(TARGET));
        assert!(out.contains("Request Log: {'timestamp': '"));
        assert!(out.contains("'method': 'GET'"));
        assert!(out.contains("'path': '/health'"));
        assert!(out.contains("'client': '127.0.0.1'"));
    }

    #[test]
    fn json_line_carries_the_record_fields() {
        let entry = LogEntry::capture(Some(&health_check()));
        let out = emit_captured(TracingSink::new(LogFormat::Json), &entry);

        assert!(out.contains(r#""kind":"request""#));
        assert!(out.contains(r#""method":"GET""#));
        assert!(out.contains(r#""client":"127.0.0.1""#));
    }

    #[test]
    fn marker_line() {
        let out = emit_captured(TracingSink::default(), &LogEntry::capture(None));
        assert!(out.contains("Logging task executed at "));
        assert!(!out.contains("method"));
    }

    #[test]
    fn parses_log_format() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        let err = "yaml".parse::<LogFormat>().unwrap_err();
        assert!(err.to_string().contains("yaml"));
    }
}
