//! Pipeline context: configuration, cancellation token, and the messages passed between stages.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::{DownloadMode, Item, Outcome};

/// Called by the writer after each result is durably logged (progress display, tests).
pub type ResultObserver = Box<dyn Fn(&ItemResult) + Send>;

/// Construction parameters for [`Coordinator::start`](super::Coordinator::start).
pub struct PipelineConfig {
    pub workers: usize,
    pub mode: DownloadMode,
    pub log_path: PathBuf,
    /// Circuit breaker ceiling: stop after this many `TIMEOUT` outcomes. 0 disables it.
    pub max_timeouts: usize,
    pub on_result: Option<ResultObserver>,
}

/// One finished item on its way from a worker to the writer.
#[derive(Clone, Debug)]
pub struct ItemResult {
    pub item: Item,
    pub outcome: Outcome,
    /// Index of the worker that processed the item.
    pub worker: usize,
}

pub fn worker_name(index: usize) -> String {
    format!("worker-{index}")
}

struct CancelInner {
    cancelled: AtomicBool,
    /// Never sent on. Dropping it disconnects `wake_rx`, which wakes every `select!` waiting on it.
    wake_tx: Mutex<Option<Sender<()>>>,
    wake_rx: Receiver<()>,
}

/// Run-wide stop signal shared by the submitter, workers and writer. Set once, never reset.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(0);
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                wake_tx: Mutex::new(Some(wake_tx)),
                wake_rx,
            }),
        }
    }

    /// Cancel and wake all waiters. Returns true only for the call that actually cancelled.
    pub fn cancel(&self) -> bool {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        let mut guard = self
            .inner
            .wake_tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        drop(guard.take());
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Becomes ready (disconnected) once the token is cancelled. Use in `select!`.
    pub fn wake_rx(&self) -> &Receiver<()> {
        &self.inner.wake_rx
    }
}

/// Per-run totals. Built by the writer; submission count filled in by the coordinator.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    pub submitted: usize,
    pub processed: usize,
    pub counts: HashMap<Outcome, usize>,
    /// Timeout counter compared against the breaker ceiling.
    pub timeouts: usize,
    pub breaker_tripped: bool,
    /// The pipeline was stopped (breaker, Ctrl+C or a fatal writer error) before the queue drained.
    pub stopped: bool,
}

impl RunSummary {
    pub fn record(&mut self, outcome: Outcome) {
        self.processed += 1;
        *self.counts.entry(outcome).or_default() += 1;
        if outcome == Outcome::Timeout {
            self.timeouts += 1;
        }
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.counts.get(&outcome).copied().unwrap_or(0)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "submitted {}, processed {}", self.submitted, self.processed)?;
        for outcome in Outcome::ALL {
            write!(f, ", {} {}", outcome, self.count(outcome))?;
        }
        if self.breaker_tripped {
            write!(f, " (stopped: timeout limit reached)")?;
        } else if self.stopped {
            write!(f, " (stopped early)")?;
        }
        Ok(())
    }
}
