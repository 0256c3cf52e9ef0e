//! CLI command handler: merge config file and flags into [`Opts`], then run the batch.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;

use crate::Opts;
use crate::batch::run_batch;
use crate::engine::arg_parser::Cli;
use crate::fetch::YtDlpFetcher;
use crate::pipeline::CancelToken;
use crate::utils::{apply_file_to_opts, load_subgrab_toml, setup_logging};

/// Defaults, then config file, then explicit flags.
pub fn setup_opts(cli: &Cli, cwd: &Path) -> Result<Opts> {
    let mut opts = Opts::default();
    if let Some(file) = load_subgrab_toml(cwd, cli.config.as_deref())? {
        apply_file_to_opts(&file, &mut opts)?;
    }
    if let Some(ref p) = cli.json_path {
        opts.manifest_path = p.clone();
    }
    if let Some(ref p) = cli.log_path {
        opts.log_path = p.clone();
    }
    if let Some(ref p) = cli.download_dir {
        opts.fetch.download_dir = p.clone();
    }
    if let Some(mode) = cli.download_mode {
        opts.mode = mode;
    }
    if let Some(v) = cli.sleep_min {
        opts.sleep_min = v;
    }
    if let Some(v) = cli.sleep_max {
        opts.sleep_max = v;
    }
    opts.range = opts.range.with_overrides(cli.start, cli.end);
    if let Some(v) = cli.threads {
        opts.workers = v;
    }
    if let Some(v) = cli.max_timeouts {
        opts.max_timeouts = v;
    }
    if !cli.retry.is_empty() {
        opts.retry = cli.retry.iter().copied().collect();
    }
    if let Some(ref lang) = cli.sub_lang {
        opts.fetch.sub_lang = lang.clone();
    }
    if let Some(v) = cli.skip_existing {
        opts.skip_existing = v;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    validate_opts(&opts)?;
    Ok(opts)
}

fn validate_opts(opts: &Opts) -> Result<()> {
    if opts.workers == 0 {
        anyhow::bail!("--threads must be at least 1");
    }
    if opts.sleep_max > 0 && opts.sleep_min > opts.sleep_max {
        anyhow::bail!(
            "--sleep-min ({}) is greater than --sleep-max ({})",
            opts.sleep_min,
            opts.sleep_max
        );
    }
    if let Some(end) = opts.range.end
        && end < opts.range.start
    {
        anyhow::bail!("--end ({}) is before --start ({})", end, opts.range.start);
    }
    Ok(())
}

/// Run the batch with the `yt-dlp` fetcher. Ctrl+C stops the pipeline; in-flight videos still get logged.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("read current directory")?;
    let opts = setup_opts(cli, &cwd)?;
    setup_logging(opts.verbose);
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );

    let cancel = CancelToken::new();
    let cancel_handler = cancel.clone();
    ctrlc::set_handler(move || {
        if cancel_handler.cancel() {
            warn!("Interrupted; waiting for running downloads to finish...");
        }
    })
    .context("set Ctrl+C handler")?;

    let fetcher = Arc::new(YtDlpFetcher::new(opts.fetch.clone()));
    let summary = run_batch(&opts, fetcher, cancel)?;
    info!("Completed. {}", summary);
    if summary.breaker_tripped {
        warn!(
            "Stopped after {} timeouts; rerun later to retry them.",
            summary.timeouts
        );
    }
    Ok(())
}
