//! Helpers shared by the integration tests

#![allow(dead_code)]

use request_log::{record::LogEntry, sink::LogSink, state::AppState};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tokio::{
    sync::Notify,
    time::{Duration, Instant, timeout},
};

/// Sink that keeps every emitted entry in memory
#[derive(Default)]
pub struct CapturingSink {
    entries: Mutex<Vec<LogEntry>>,
    emitted: Notify,
}

impl LogSink for CapturingSink {
    fn emit(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
        self.emitted.notify_one();
    }
}

impl CapturingSink {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Waits until at least `count` entries were emitted, panicking after two seconds
    pub async fn wait_for(&self, count: usize) -> Vec<LogEntry> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let entries = self.entries();
            if entries.len() >= count {
                return entries;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if timeout(remaining, self.emitted.notified()).await.is_err() {
                panic!("expected {} log entries, got {:?}", count, entries);
            }
        }
    }
}

pub fn state_with(sink: Arc<CapturingSink>, static_dir: Option<PathBuf>) -> Arc<AppState> {
    Arc::new(AppState { sink, static_dir })
}

/// Pulls the ISO-8601 timestamp out of a rendered request log line
pub fn timestamp_of(line: &str) -> &str {
    let key = "'timestamp': '";
    let start = line.find(key).expect("no timestamp") + key.len();
    let end = line[start..].find('\'').expect("unterminated timestamp") + start;
    &line[start..end]
}
