use crossbeam_channel::{Receiver, Sender, select};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::fetch::MediaFetcher;
use crate::retrieval::retrieve;
use crate::{DownloadMode, Item, Outcome};

use super::context::{CancelToken, ItemResult, worker_name};

/// Single worker: take items from job_rx, run retrieval, send the result to the writer.
/// Exits when cancelled, when the job queue is closed and empty, or when the writer is gone.
fn worker_loop(
    index: usize,
    job_rx: Receiver<Item>,
    result_tx: Sender<ItemResult>,
    fetcher: Arc<dyn MediaFetcher>,
    mode: DownloadMode,
    cancel: CancelToken,
) {
    let name = worker_name(index);
    loop {
        let item = select! {
            recv(cancel.wake_rx()) -> _ => break,
            recv(job_rx) -> msg => match msg {
                Ok(item) => item,
                Err(_) => break,
            },
        };
        // select! picks at random when both are ready; never start new work after a stop.
        if cancel.is_cancelled() {
            log::debug!("{}: stopped, leaving {} for the next run", name, item.id);
            break;
        }
        log::info!("Video {} is consumed by {}", item.id, name);
        let outcome = catch_unwind(AssertUnwindSafe(|| retrieve(fetcher.as_ref(), &item, mode)))
            .unwrap_or_else(|_| {
                log::error!("{}: retrieval of {} panicked", name, item.id);
                Outcome::Failed
            });
        let result = ItemResult {
            item,
            outcome,
            worker: index,
        };
        if result_tx.send(result).is_err() {
            log::debug!("{}: result queue closed", name);
            break;
        }
    }
    drop(result_tx);
    log::debug!("{} exiting", name);
}

/// Spawn `workers` named worker threads. Caller must drop its own `result_tx` so the writer
/// sees the result queue close once every worker is done.
pub fn spawn_workers(
    workers: usize,
    job_rx: &Receiver<Item>,
    result_tx: &Sender<ItemResult>,
    fetcher: &Arc<dyn MediaFetcher>,
    mode: DownloadMode,
    cancel: &CancelToken,
) -> std::io::Result<Vec<JoinHandle<()>>> {
    (0..workers)
        .map(|index| {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let fetcher = Arc::clone(fetcher);
            let cancel = cancel.clone();
            thread::Builder::new()
                .name(worker_name(index))
                .spawn(move || worker_loop(index, job_rx, result_tx, fetcher, mode, cancel))
        })
        .collect()
}
