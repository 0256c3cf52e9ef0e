//! Batch driver: manifest → filtered items → paced submission into the pipeline.

use anyhow::{Context, Result};
use log::{debug, info};
use rand::Rng;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::Opts;
use crate::engine::progress::{create_counter, refresh_bar, update_progress_bar};
use crate::fetch::{MediaFetcher, artifacts_exist};
use crate::pipeline::{
    CancelToken, Coordinator, ItemResult, PipelineConfig, ResultObserver, RunSummary,
};
use crate::resume::load_completed;
use crate::source::{ItemSource, load_manifest};
use crate::utils::config::CANCEL_POLL_INTERVAL;

/// Sleep `secs`, waking early if `cancel` fires.
fn paced_sleep(secs: u64, cancel: &CancelToken) {
    let deadline = Instant::now() + Duration::from_secs(secs);
    while !cancel.is_cancelled() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(CANCEL_POLL_INTERVAL.min(deadline - now));
    }
}

fn progress_observer(verbose: bool) -> Option<ResultObserver> {
    verbose.then(|| {
        let bar = create_counter("Processed");
        refresh_bar(&bar);
        Box::new(move |_: &ItemResult| update_progress_bar(&bar, 1)) as ResultObserver
    })
}

/// Process every pending item of the manifest in `opts`.
///
/// Items already completed in the resume log (latest outcome not in `opts.retry`) are skipped.
/// Returns once submission is exhausted or the pipeline stopped, and every started item is logged.
/// A malformed manifest entry stops the run: results already in flight are logged, then the error is returned.
pub fn run_batch(
    opts: &Opts,
    fetcher: Arc<dyn MediaFetcher>,
    cancel: CancelToken,
) -> Result<RunSummary> {
    let groups = load_manifest(&opts.manifest_path)?;
    let completed = load_completed(&opts.log_path, &opts.retry)?;
    info!(
        "{} videos already processed according to {}",
        completed.len(),
        opts.log_path.display()
    );

    let coordinator = Coordinator::start_with_cancel(
        fetcher,
        PipelineConfig {
            workers: opts.workers,
            mode: opts.mode,
            log_path: opts.log_path.clone(),
            max_timeouts: opts.max_timeouts,
            on_result: progress_observer(opts.verbose),
        },
        cancel.clone(),
    )?;

    let mut rng = rand::thread_rng();
    let mut source = ItemSource::new(&groups, &completed, opts.range);
    let mut failure = None;
    for next in source.by_ref() {
        let item = match next {
            Ok(item) => item,
            Err(e) => {
                failure = Some(e);
                break;
            }
        };
        if opts.skip_existing && artifacts_exist(&opts.fetch.download_dir, &item.id) {
            debug!("Skipping {}: artifacts already on disk", item.id);
            continue;
        }
        if opts.sleep_max != 0 {
            let low = opts.sleep_min.min(opts.sleep_max);
            paced_sleep(rng.gen_range(low..=opts.sleep_max), &cancel);
        }
        if let Err(e) = coordinator.submit(item) {
            debug!("Submission ended: {}", e);
            break;
        }
    }
    debug!("Submission stopped at manifest line {}", source.line());

    if failure.is_some() {
        coordinator.stop();
    }
    let summary = coordinator.finish()?;
    if let Some(e) = failure {
        info!("Partial run: {}", summary);
        return Err(e).context("invalid manifest entry");
    }
    Ok(summary)
}
