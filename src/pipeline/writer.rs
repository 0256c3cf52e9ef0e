//! Result writer: the only owner of the resume log during a run; runs the circuit breaker.

use anyhow::Result;
use crossbeam_channel::Receiver;
use std::thread::{self, JoinHandle};

use crate::Outcome;
use crate::resume::ResumeLog;
use crate::utils::Colors;

use super::context::{CancelToken, ItemResult, ResultObserver, RunSummary, worker_name};

pub struct WriterParams {
    pub log: ResumeLog,
    pub max_timeouts: usize,
    pub cancel: CancelToken,
    pub on_result: Option<ResultObserver>,
}

/// Drain `result_rx` until every worker has dropped its sender, appending each result to the log.
/// A failed append cancels the run and ends the writer with that error.
pub fn writer_loop(result_rx: Receiver<ItemResult>, params: WriterParams) -> Result<RunSummary> {
    let WriterParams {
        mut log,
        max_timeouts,
        cancel,
        on_result,
    } = params;
    let mut summary = RunSummary::default();

    while let Ok(result) = result_rx.recv() {
        summary.record(result.outcome);
        if result.outcome == Outcome::Timeout
            && max_timeouts > 0
            && summary.timeouts >= max_timeouts
            && !summary.breaker_tripped
        {
            log::warn!(
                "Reached max number of timeouts {}; no new items will be started.",
                max_timeouts
            );
            summary.breaker_tripped = true;
            cancel.cancel();
        }
        log::info!(
            "Video {} finished with state {} by {}.",
            result.item.id,
            Colors::outcome(result.outcome),
            worker_name(result.worker)
        );
        if let Err(e) = log.append(&result.item.id, result.outcome) {
            cancel.cancel();
            return Err(e);
        }
        if let Some(ref cb) = on_result {
            cb(&result);
        }
    }
    summary.stopped = cancel.is_cancelled();
    log::debug!("writer: result queue closed after {} results", summary.processed);
    Ok(summary)
}

pub fn spawn_writer(
    result_rx: Receiver<ItemResult>,
    params: WriterParams,
) -> std::io::Result<JoinHandle<Result<RunSummary>>> {
    thread::Builder::new()
        .name("writer".to_string())
        .spawn(move || writer_loop(result_rx, params))
}
