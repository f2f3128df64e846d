//! Per-request registry of work that runs after the response has been handed off.

use axum::{
    body::{Body, Bytes},
    response::Response,
};
use http_body::{Body as HttpBody, Frame, SizeHint};
use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
    task::{Context, Poll},
};
use tokio::runtime::Handle;
use tracing::{debug, warn};

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
type Task = Box<dyn FnOnce() -> BoxFuture + Send + 'static>;

/// Deferred-task registry shared by everything that handles one request
///
/// Clones share the same task list. The list is drained exactly once, when the
/// response body wrapped by [`BackgroundTasks::attach`] is dropped by the server,
/// so every registered task runs at most once and never before the response
/// has left the handler pipeline.
#[derive(Clone)]
pub struct BackgroundTasks {
    pending: Arc<Pending>,
}

/// Task list shared by all clones of one registry, `None` once drained
struct Pending(Mutex<Option<Vec<Task>>>);

impl Drop for Pending {
    fn drop(&mut self) {
        let tasks = self.0.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(tasks) = tasks.as_ref().filter(|tasks| !tasks.is_empty()) {
            debug!(
                count = tasks.len(),
                "request dropped before its response was sent, discarding background tasks"
            );
        }
    }
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Pending(Mutex::new(Some(Vec::new())))),
        }
    }

    /// Registers a zero-argument task. Never blocks on the task itself.
    pub fn add_task<F, Fut>(&self, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.0.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.as_mut() {
            Some(tasks) => tasks.push(Box::new(move || Box::pin(task()) as BoxFuture)),
            None => warn!("background tasks already drained, discarding late task"),
        }
    }

    pub fn len(&self) -> usize {
        self.pending
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wraps the response body so the registry is drained once the body is dropped
    pub fn attach(self, response: Response) -> Response {
        let (parts, body) = response.into_parts();
        let body = Body::new(RunAfterBody {
            inner: body,
            tasks: Some(self),
        });
        Response::from_parts(parts, body)
    }

    /// Drains the registry and hands its tasks to the current tokio runtime
    ///
    /// Tasks run in registration order, each in its own tokio task, so a panic in
    /// one is logged and does not stop the rest. Calling this a second time is a no-op.
    pub fn run_detached(&self) {
        let tasks = self.drain();
        if tasks.is_empty() {
            return;
        }

        match Handle::try_current() {
            Ok(handle) => {
                debug!(count = tasks.len(), "running background tasks");
                handle.spawn(run_in_order(tasks));
            }
            Err(_) => warn!(
                count = tasks.len(),
                "no async runtime available, dropping background tasks"
            ),
        }
    }

    fn drain(&self) -> Vec<Task> {
        self.pending
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or_default()
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BackgroundTasks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundTasks")
            .field("pending", &self.len())
            .finish()
    }
}

async fn run_in_order(tasks: Vec<Task>) {
    for task in tasks {
        if let Err(err) = tokio::spawn(task()).await {
            warn!(error = %err, "background task failed");
        }
    }
}

/// Response body that releases its request's background tasks when dropped
struct RunAfterBody {
    inner: Body,
    tasks: Option<BackgroundTasks>,
}

impl HttpBody for RunAfterBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Pin::new(&mut self.inner).poll_frame(cx)
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }
}

impl Drop for RunAfterBody {
    fn drop(&mut self) {
        if let Some(tasks) = self.tasks.take() {
            tasks.run_detached();
        }
    }
}
