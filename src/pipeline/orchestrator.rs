use anyhow::{Context, Result};
use crossbeam_channel::{SendTimeoutError, Sender, bounded};
use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use crate::Item;
use crate::fetch::MediaFetcher;
use crate::resume::ResumeLog;
use crate::utils::config::{CANCEL_POLL_INTERVAL, QUEUE_FACTOR};

use super::context::{CancelToken, PipelineConfig, RunSummary};
use super::worker::spawn_workers;
use super::writer::{WriterParams, spawn_writer};

/// Why [`Coordinator::submit`] gave the item back.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("pipeline stopped; item {} not submitted", .0.id)]
    Stopped(Item),
}

impl SubmitError {
    pub fn into_item(self) -> Item {
        match self {
            SubmitError::Stopped(item) => item,
        }
    }
}

/// Running pipeline: submission queue → workers → result queue → writer → resume log.
pub struct Coordinator {
    job_tx: Sender<Item>,
    cancel: CancelToken,
    submitted: AtomicUsize,
    worker_handles: Vec<JoinHandle<()>>,
    writer_handle: JoinHandle<Result<RunSummary>>,
}

impl Coordinator {
    /// Open the resume log and start the writer and `config.workers` workers.
    /// Both queues hold `2 × workers` entries.
    pub fn start(fetcher: Arc<dyn MediaFetcher>, config: PipelineConfig) -> Result<Self> {
        Self::start_with_cancel(fetcher, config, CancelToken::new())
    }

    /// Like [`Coordinator::start`], stopping when `cancel` is cancelled by the caller too.
    pub fn start_with_cancel(
        fetcher: Arc<dyn MediaFetcher>,
        config: PipelineConfig,
        cancel: CancelToken,
    ) -> Result<Self> {
        if config.workers == 0 {
            anyhow::bail!("worker count must be at least 1");
        }
        let log = ResumeLog::open(&config.log_path)?;
        let cap = QUEUE_FACTOR * config.workers;
        let (job_tx, job_rx) = bounded::<Item>(cap);
        let (result_tx, result_rx) = bounded(cap);
        debug!(
            "Starting pipeline: {} workers, mode {}, queue cap {}, log {}",
            config.workers,
            config.mode,
            cap,
            log.path().display()
        );

        let writer_handle = spawn_writer(
            result_rx,
            WriterParams {
                log,
                max_timeouts: config.max_timeouts,
                cancel: cancel.clone(),
                on_result: config.on_result,
            },
        )
        .context("spawn writer thread")?;

        let worker_handles = match spawn_workers(
            config.workers,
            &job_rx,
            &result_tx,
            &fetcher,
            config.mode,
            &cancel,
        ) {
            Ok(handles) => handles,
            Err(e) => {
                // Threads that did start see the cancel and exit; the writer follows once they do.
                cancel.cancel();
                return Err(e).context("spawn worker threads");
            }
        };

        // Only workers may hold these ends, so queue closure tracks worker lifetime.
        drop(job_rx);
        drop(result_tx);

        Ok(Self {
            job_tx,
            cancel,
            submitted: AtomicUsize::new(0),
            worker_handles,
            writer_handle,
        })
    }

    /// Blocking push onto the submission queue. Blocks while the pipeline is saturated;
    /// returns the item if the pipeline is (or becomes) stopped.
    ///
    /// Waits in `send_timeout` slices rather than `select!`: a losing `send` arm would consume
    /// the item, while `SendTimeoutError` hands it back so `Stopped` can return it.
    pub fn submit(&self, item: Item) -> Result<(), SubmitError> {
        let mut item = item;
        loop {
            if self.cancel.is_cancelled() {
                return Err(SubmitError::Stopped(item));
            }
            match self.job_tx.send_timeout(item, CANCEL_POLL_INTERVAL) {
                Ok(()) => {
                    self.submitted.fetch_add(1, Ordering::Relaxed);
                    return Ok(());
                }
                Err(SendTimeoutError::Timeout(back)) => item = back,
                Err(SendTimeoutError::Disconnected(back)) => {
                    return Err(SubmitError::Stopped(back));
                }
            }
        }
    }

    /// Stop starting new items and wake every idle worker. In-flight items still finish and are logged.
    pub fn stop(&self) {
        if self.cancel.cancel() {
            debug!("Pipeline stop requested");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Handle for stopping the pipeline from elsewhere (e.g. a Ctrl+C handler).
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Close the submission queue, let queued work drain (unless stopped), join all threads.
    pub fn finish(self) -> Result<RunSummary> {
        let Coordinator {
            job_tx,
            cancel: _cancel,
            submitted,
            worker_handles,
            writer_handle,
        } = self;
        // Dropping the only sender closes the queue so workers exit once it is empty.
        drop(job_tx);

        let mut panicked = 0_usize;
        for h in worker_handles {
            if h.join().is_err() {
                panicked += 1;
            }
        }
        let mut summary = writer_handle
            .join()
            .map_err(|_| anyhow::anyhow!("writer thread panicked"))??;
        if panicked > 0 {
            anyhow::bail!("{} worker thread(s) panicked", panicked);
        }
        summary.submitted = submitted.into_inner();
        debug!("Pipeline finished: {}", summary);
        Ok(summary)
    }
}
