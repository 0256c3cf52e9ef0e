//! Coordinator tests: outcomes logged, circuit breaker, backpressure, stop/finish.

mod support;

use crossbeam_channel::{RecvTimeoutError, bounded, unbounded};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use subgrab::pipeline::{ItemResult, ResultObserver};
use subgrab::{Coordinator, DownloadMode, FetchStatus, Outcome, PipelineConfig, SubmitError};

use support::{ALL_OK, ScriptedFetcher, item, sorted_log_lines};

const WAIT: Duration = Duration::from_secs(5);

fn config(dir: &std::path::Path, workers: usize, mode: DownloadMode) -> PipelineConfig {
    PipelineConfig {
        workers,
        mode,
        log_path: dir.join("processed.log"),
        max_timeouts: 0,
        on_result: None,
    }
}

// --- outcomes ---

#[test]
fn test_subtitles_or_audio_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = ScriptedFetcher::new(ALL_OK)
        .with(
            "item2",
            (FetchStatus::Failed, FetchStatus::Success, FetchStatus::Success),
        )
        .with(
            "item3",
            (FetchStatus::Failed, FetchStatus::Success, FetchStatus::Failed),
        );
    let coordinator = Coordinator::start(
        Arc::new(fetcher),
        config(dir.path(), 2, DownloadMode::SubtitlesOrAudio),
    )
    .unwrap();
    for id in ["item1", "item2", "item3"] {
        coordinator.submit(item(id)).unwrap();
    }
    let summary = coordinator.finish().unwrap();

    assert_eq!(
        sorted_log_lines(&dir.path().join("processed.log")),
        vec!["item1,SUBTITLES", "item2,AUDIO", "item3,FAILED"]
    );
    assert_eq!(summary.submitted, 3);
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.count(Outcome::SubtitlesDownloaded), 1);
    assert_eq!(summary.count(Outcome::AudioDownloaded), 1);
    assert_eq!(summary.count(Outcome::Failed), 1);
    assert!(!summary.stopped);
}

#[test]
fn test_finish_drains_everything_queued() {
    let dir = tempfile::tempdir().unwrap();
    let coordinator = Coordinator::start(
        Arc::new(ScriptedFetcher::new(ALL_OK)),
        config(dir.path(), 3, DownloadMode::SubtitlesAndAudio),
    )
    .unwrap();
    for i in 0..20 {
        coordinator.submit(item(&format!("v{i:02}"))).unwrap();
    }
    let summary = coordinator.finish().unwrap();
    let lines = sorted_log_lines(&dir.path().join("processed.log"));
    assert_eq!(lines.len(), 20);
    assert!(lines.iter().all(|l| l.ends_with(",SUBTITLES_AUDIO")));
    assert_eq!(summary.processed, 20);
}

#[test]
fn test_failures_do_not_kill_workers() {
    let dir = tempfile::tempdir().unwrap();
    let all_failed = (FetchStatus::Failed, FetchStatus::Failed, FetchStatus::Failed);
    let coordinator = Coordinator::start(
        Arc::new(ScriptedFetcher::new(all_failed)),
        config(dir.path(), 1, DownloadMode::AudioOnly),
    )
    .unwrap();
    for i in 0..5 {
        coordinator.submit(item(&format!("f{i}"))).unwrap();
    }
    let summary = coordinator.finish().unwrap();
    assert_eq!(summary.count(Outcome::Failed), 5);
}

// --- circuit breaker ---

#[test]
fn test_circuit_breaker_trips_after_exact_count() {
    let dir = tempfile::tempdir().unwrap();
    let timeouts = (
        FetchStatus::TimedOut,
        FetchStatus::Success,
        FetchStatus::TimedOut,
    );
    let (done_tx, done_rx) = unbounded::<String>();
    let observer: ResultObserver = Box::new(move |r: &ItemResult| {
        let _ = done_tx.send(r.item.id.clone());
    });
    let coordinator = Coordinator::start(
        Arc::new(ScriptedFetcher::new(timeouts)),
        PipelineConfig {
            max_timeouts: 3,
            on_result: Some(observer),
            ..config(dir.path(), 1, DownloadMode::SubtitlesOnly)
        },
    )
    .unwrap();

    // One item at a time: each submission waits until the previous result is logged.
    let mut accepted = 0;
    for i in 0..10 {
        match coordinator.submit(item(&format!("t{i}"))) {
            Ok(()) => {
                accepted += 1;
                done_rx.recv_timeout(WAIT).unwrap();
            }
            Err(SubmitError::Stopped(rejected)) => {
                assert_eq!(rejected.id, format!("t{i}"));
                break;
            }
        }
    }
    let summary = coordinator.finish().unwrap();

    assert_eq!(accepted, 3);
    let lines = sorted_log_lines(&dir.path().join("processed.log"));
    assert_eq!(lines, vec!["t0,TIMEOUT", "t1,TIMEOUT", "t2,TIMEOUT"]);
    assert!(summary.breaker_tripped);
    assert!(summary.stopped);
    assert_eq!(summary.timeouts, 3);
}

#[test]
fn test_breaker_disabled_with_zero_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let timeouts = (
        FetchStatus::TimedOut,
        FetchStatus::TimedOut,
        FetchStatus::TimedOut,
    );
    let coordinator = Coordinator::start(
        Arc::new(ScriptedFetcher::new(timeouts)),
        config(dir.path(), 2, DownloadMode::AudioOnly),
    )
    .unwrap();
    for i in 0..6 {
        coordinator.submit(item(&format!("t{i}"))).unwrap();
    }
    let summary = coordinator.finish().unwrap();
    assert_eq!(summary.timeouts, 6);
    assert!(!summary.breaker_tripped);
}

// --- backpressure ---

#[test]
fn test_submit_blocks_when_pipeline_is_saturated() {
    let dir = tempfile::tempdir().unwrap();
    let (gate_tx, gate_rx) = unbounded::<()>();
    let coordinator = Coordinator::start(
        Arc::new(ScriptedFetcher::new(ALL_OK).gated(gate_rx)),
        config(dir.path(), 1, DownloadMode::AudioOnly),
    )
    .unwrap();

    let (progress_tx, progress_rx) = bounded::<usize>(8);
    let submitter = thread::spawn(move || {
        for i in 0..4 {
            coordinator.submit(item(&format!("b{i}"))).unwrap();
            progress_tx.send(i + 1).unwrap();
        }
        coordinator
    });

    // One item held by the paused worker plus 2 × 1 queued.
    for expected in 1..=3 {
        assert_eq!(progress_rx.recv_timeout(WAIT).unwrap(), expected);
    }
    assert_eq!(
        progress_rx.recv_timeout(Duration::from_millis(500)),
        Err(RecvTimeoutError::Timeout)
    );

    gate_tx.send(()).unwrap();
    assert_eq!(progress_rx.recv_timeout(WAIT).unwrap(), 4);

    for _ in 0..3 {
        gate_tx.send(()).unwrap();
    }
    let coordinator = submitter.join().unwrap();
    let summary = coordinator.finish().unwrap();
    assert_eq!(summary.processed, 4);
    assert_eq!(sorted_log_lines(&dir.path().join("processed.log")).len(), 4);
}

// --- stop / finish ---

#[test]
fn test_stop_wakes_idle_workers() {
    let dir = tempfile::tempdir().unwrap();
    let coordinator = Coordinator::start(
        Arc::new(ScriptedFetcher::new(ALL_OK)),
        config(dir.path(), 4, DownloadMode::SubtitlesOnly),
    )
    .unwrap();
    let started = Instant::now();
    coordinator.stop();
    assert!(coordinator.is_stopped());
    let summary = coordinator.finish().unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(summary.processed, 0);
    assert!(summary.stopped);
    assert!(!summary.breaker_tripped);
}

#[test]
fn test_stop_logs_in_flight_and_leaves_queued_items() {
    let dir = tempfile::tempdir().unwrap();
    let (gate_tx, gate_rx) = unbounded::<()>();
    let fetcher = Arc::new(ScriptedFetcher::new(ALL_OK).gated(gate_rx));
    let coordinator = Coordinator::start(
        fetcher.clone(),
        config(dir.path(), 1, DownloadMode::SubtitlesOnly),
    )
    .unwrap();
    for id in ["s0", "s1", "s2"] {
        coordinator.submit(item(id)).unwrap();
    }
    // Wait until the worker is inside the fetch for s0.
    let deadline = Instant::now() + WAIT;
    while fetcher.seen_ids().is_empty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(fetcher.seen_ids(), vec!["s0"]);

    coordinator.stop();
    assert!(matches!(
        coordinator.submit(item("s3")),
        Err(SubmitError::Stopped(_))
    ));
    gate_tx.send(()).unwrap();
    let summary = coordinator.finish().unwrap();

    assert_eq!(
        sorted_log_lines(&dir.path().join("processed.log")),
        vec!["s0,SUBTITLES"]
    );
    assert_eq!(summary.submitted, 3);
    assert_eq!(summary.processed, 1);
    assert_eq!(fetcher.seen_ids(), vec!["s0"]);
}

#[test]
fn test_external_cancel_token_stops_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let cancel = subgrab::CancelToken::new();
    let coordinator = Coordinator::start_with_cancel(
        Arc::new(ScriptedFetcher::new(ALL_OK)),
        config(dir.path(), 2, DownloadMode::SubtitlesOnly),
        cancel.clone(),
    )
    .unwrap();
    assert!(cancel.cancel());
    assert!(!cancel.cancel());
    assert!(coordinator.is_stopped());
    assert!(coordinator.submit(item("late")).is_err());
    assert_eq!(coordinator.finish().unwrap().processed, 0);
}

// --- startup errors ---

#[test]
fn test_zero_workers_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let result = Coordinator::start(
        Arc::new(ScriptedFetcher::new(ALL_OK)),
        config(dir.path(), 0, DownloadMode::SubtitlesOnly),
    );
    assert!(result.is_err());
}

#[cfg(target_os = "linux")]
#[test]
fn test_failed_append_stops_pipeline_and_surfaces_error() {
    let dir = tempfile::tempdir().unwrap();
    // Opens fine, every write fails with ENOSPC.
    let coordinator = Coordinator::start(
        Arc::new(ScriptedFetcher::new(ALL_OK)),
        PipelineConfig {
            log_path: "/dev/full".into(),
            ..config(dir.path(), 2, DownloadMode::SubtitlesOnly)
        },
    )
    .unwrap();
    coordinator.submit(item("first")).unwrap();

    let deadline = Instant::now() + WAIT;
    while !coordinator.is_stopped() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert!(coordinator.is_stopped());
    assert!(matches!(
        coordinator.submit(item("later")),
        Err(SubmitError::Stopped(_))
    ));

    let started = Instant::now();
    let err = coordinator.finish().unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(
        format!("{:#}", err).contains("append to resume log"),
        "{err:#}"
    );
}

#[test]
fn test_unwritable_log_is_fatal_at_start() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the log file should be.
    let result = Coordinator::start(
        Arc::new(ScriptedFetcher::new(ALL_OK)),
        PipelineConfig {
            log_path: dir.path().to_path_buf(),
            ..config(dir.path(), 1, DownloadMode::SubtitlesOnly)
        },
    );
    assert!(result.is_err());
}
