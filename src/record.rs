//! Request snapshots and the log entries built from them.

use axum::{extract::ConnectInfo, http::Request};
use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::{fmt, net::SocketAddr};

/// Peer information, present only when the server exposes connect info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub host: String,
}

/// Request metadata captured while the request is still being handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSnapshot {
    pub method: String,
    /// Percent-decoded URI path, never including the query string
    pub path: String,
    pub client: Option<ClientInfo>,
}

impl RequestSnapshot {
    /// Captures method, path and peer address from an incoming request
    ///
    /// The peer address comes from `ConnectInfo<SocketAddr>`, which axum only
    /// inserts when the app is served with `into_make_service_with_connect_info`.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let client = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| ClientInfo {
                host: addr.ip().to_string(),
            });

        Self {
            method: req.method().to_string(),
            path: percent_decode_str(req.uri().path())
                .decode_utf8_lossy()
                .into_owned(),
            client,
        }
    }
}

/// One request log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub path: String,
    pub client: Option<String>,
}

/// What a deferred log action emits
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEntry {
    Request(LogRecord),
    /// Emitted when the action was registered without a request
    Marker {
        #[serde(serialize_with = "serialize_timestamp")]
        timestamp: DateTime<Utc>,
    },
}

impl LogEntry {
    /// Builds the entry for `request`, stamped with the current time
    pub fn capture(request: Option<&RequestSnapshot>) -> Self {
        Self::at(Utc::now(), request)
    }

    pub fn at(timestamp: DateTime<Utc>, request: Option<&RequestSnapshot>) -> Self {
        match request {
            Some(req) => Self::Request(LogRecord {
                timestamp,
                method: req.method.clone(),
                path: req.path.clone(),
                client: req.client.as_ref().map(|c| c.host.clone()),
            }),
            None => Self::Marker { timestamp },
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Request(record) => record.timestamp,
            Self::Marker { timestamp } => *timestamp,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(record) => write!(
                f,
                "Request Log: {{'timestamp': {}, 'method': {}, 'path': {}, 'client': {}}}",
                quoted(&iso8601(&record.timestamp)),
                quoted(&record.method),
                quoted(&record.path),
                record.client.as_deref().map_or_else(|| "None".to_string(), quoted),
            ),
            Self::Marker { timestamp } => {
                write!(f, "Logging task executed at {}", iso8601(timestamp))
            }
        }
    }
}

/// Single-quoted string literal, as in a Python dict repr
fn quoted(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn iso8601(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn serialize_timestamp<S: serde::Serializer>(
    ts: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&iso8601(ts))
}
