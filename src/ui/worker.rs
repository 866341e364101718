//! # Filter Worker
//!
//! One long-lived background task owning the debounce timer. The render loop
//! pushes raw query strings at it (best-effort, drop-on-full: only the latest
//! matters) and it answers through a single-slot result cell, never blocking
//! either side.
//!
//! Query flow: every arriving string re-arms a 300ms quiet-period deadline;
//! only when the deadline fires with no newer query does the worker run the
//! fetch pipeline — apply (or reset) the name filter on the source, then list.
//! Source failures surface on the status line and abandon that one fetch; the
//! worker itself keeps running. Fetches never overlap: the pipeline is
//! awaited inline, a newer query re-debounces after it completes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::source::{Item, Source, SourceError};
use crate::ui::status::StatusLine;

/// Quiet period between the last keystroke and the fetch it triggers.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Pending queries the render loop may burst before the worker drains them.
const QUERY_QUEUE_CAPACITY: usize = 64;

/// Single-slot handoff cell between the worker and the render loop.
///
/// `publish` overwrites any unconsumed snapshot — only the newest list
/// matters — and `take` never blocks the render thread.
#[derive(Debug, Clone, Default)]
pub struct ResultSlot {
    inner: Arc<Mutex<Option<Vec<Item>>>>,
}

impl ResultSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, items: Vec<Item>) {
        match self.inner.lock() {
            Ok(mut guard) => *guard = Some(items),
            Err(poisoned) => *poisoned.into_inner() = Some(items),
        }
    }

    pub fn take(&self) -> Option<Vec<Item>> {
        match self.inner.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

/// Handle to the background filter task.
pub struct FilterWorker {
    query_tx: mpsc::Sender<String>,
    stop_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl FilterWorker {
    /// Spawn the worker with the standard debounce delay. Performs one
    /// immediate unfiltered fetch so the list is populated at startup.
    pub fn spawn(source: Arc<dyn Source>, results: ResultSlot, status: StatusLine) -> Self {
        Self::spawn_with_delay(source, results, status, DEBOUNCE_DELAY)
    }

    /// Spawn with an explicit debounce delay (tests use short delays).
    pub fn spawn_with_delay(
        source: Arc<dyn Source>,
        results: ResultSlot,
        status: StatusLine,
        delay: Duration,
    ) -> Self {
        let (query_tx, query_rx) = mpsc::channel(QUERY_QUEUE_CAPACITY);
        let (stop_tx, stop_rx) = oneshot::channel();

        let task = WorkerTask {
            source,
            results,
            status,
            delay,
        };
        let handle = tokio::spawn(task.run(query_rx, stop_rx));

        Self {
            query_tx,
            stop_tx: Some(stop_tx),
            handle,
        }
    }

    /// Hand the latest query text to the worker. Non-blocking: when the
    /// queue is full the keystroke is simply dropped, a later edit will
    /// carry the final text anyway.
    pub fn send_query(&self, query: String) {
        let _ = self.query_tx.try_send(query);
    }

    /// Signal the worker to stop. Safe to call more than once; dropping the
    /// handle without calling it stops the worker too.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }

    /// Await worker shutdown (used by tests to make teardown deterministic).
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

struct WorkerTask {
    source: Arc<dyn Source>,
    results: ResultSlot,
    status: StatusLine,
    delay: Duration,
}

enum FetchError {
    Filter(SourceError),
    List(SourceError),
}

impl WorkerTask {
    async fn run(self, mut query_rx: mpsc::Receiver<String>, mut stop_rx: oneshot::Receiver<()>) {
        // Initial population: no debounce, empty filter.
        self.fetch(String::new()).await;

        let mut pending: Option<String> = None;
        let mut deadline = Instant::now();

        loop {
            tokio::select! {
                query = query_rx.recv() => match query {
                    Some(query) => {
                        // Most-recent-wins: re-arm the quiet period.
                        pending = Some(query);
                        deadline = Instant::now() + self.delay;
                    }
                    None => break,
                },
                _ = &mut stop_rx => break,
                _ = tokio::time::sleep_until(deadline), if pending.is_some() => {
                    if let Some(query) = pending.take() {
                        self.fetch(query).await;
                    }
                }
            }
        }
    }

    /// Apply the filter, list, and publish. Errors abort this fetch only.
    async fn fetch(&self, query: String) {
        let source = Arc::clone(&self.source);
        let fetched = tokio::task::spawn_blocking(move || {
            let applied = if query.is_empty() {
                source.reset_filters()
            } else {
                source.set_filter_name(&query)
            };
            applied.map_err(FetchError::Filter)?;
            source.list().map_err(FetchError::List)
        })
        .await;

        match fetched {
            Ok(Ok(items)) => self.results.publish(items),
            Ok(Err(FetchError::Filter(e))) => self.status.set(format!("Filter error: {e}")),
            Ok(Err(FetchError::List(e))) => self.status.set(format!("List error: {e}")),
            Err(e) => self.status.set(format!("List error: {e}")),
        }
    }
}

/// Spawn a fire-and-forget launch of `item` via the source's `run`.
///
/// Status transitions are the only side effect: `Running:` synchronously,
/// then `Launched:` or `Run error:` from whatever thread the call completes
/// on. List and selection state are never touched.
pub fn spawn_launch(source: &Arc<dyn Source>, status: &StatusLine, item: Item) {
    status.set(format!("Running: {}", item.name));

    let source = Arc::clone(source);
    let status = status.clone();
    tokio::spawn(async move {
        let id = item.id.clone();
        let outcome = tokio::task::spawn_blocking(move || source.run(&id)).await;
        match outcome {
            Ok(Ok(())) => status.set(format!("Launched: {}", item.name)),
            Ok(Err(e)) => status.set(format!("Run error: {e}")),
            Err(e) => status.set(format!("Run error: {e}")),
        }
    });
}
