//! Per-request log recording, deferred until after the response.

use std::sync::Arc;

use crate::{
    record::{LogEntry, RequestSnapshot},
    sink::LogSink,
    tasks::BackgroundTasks,
};

/// Registers one deferred action that logs `request` to `sink`
///
/// Nothing is emitted here. The action reads the clock when it runs, so the
/// logged timestamp is the emission time, not the arrival time. Without a
/// request it emits the bare `Logging task executed at ...` marker instead.
pub fn record_request(
    tasks: &BackgroundTasks,
    request: Option<RequestSnapshot>,
    sink: Arc<dyn LogSink>,
) {
    tasks.add_task(move || async move {
        let entry = LogEntry::capture(request.as_ref());
        sink.emit(&entry);
    });
}
