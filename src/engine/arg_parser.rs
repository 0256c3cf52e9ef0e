use clap::Parser;
use std::path::PathBuf;

use crate::{DownloadMode, Outcome};

/// Resumable bulk downloader for video subtitles and audio.
///
/// Every flag is optional; unset flags fall back to `subgrab.toml` (or `--config`), then to built-in defaults.
#[derive(Clone, Debug, Parser)]
#[command(name = "subgrab")]
#[command(about = "Fetch subtitles and/or audio for every video in a manifest; resumes from the processed log.")]
pub struct Cli {
    /// JSON manifest with the videos to process. Default: ./step3.json
    #[arg(long, value_name = "PATH")]
    pub json_path: Option<PathBuf>,

    /// Resume log (`id,OUTCOME` per line). Default: ./processed.log
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Directory receiving one sub-directory of artifacts per video. Default: ./download
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// SUBTITLES_ONLY, AUDIO_ONLY, SUBTITLES_OR_AUDIO or SUBTITLES_AND_AUDIO. Default: SUBTITLES_ONLY
    #[arg(long, value_parser = clap::value_parser!(DownloadMode))]
    pub download_mode: Option<DownloadMode>,

    /// Minimum pause before each submission, in seconds.
    #[arg(long)]
    pub sleep_min: Option<u64>,

    /// Maximum pause before each submission, in seconds. 0 disables pacing. Default: 5
    #[arg(long)]
    pub sleep_max: Option<u64>,

    /// First manifest line (1-based) to process.
    #[arg(long)]
    pub start: Option<usize>,

    /// Last manifest line (1-based, inclusive) to process; -1 for no limit.
    #[arg(long, allow_hyphen_values = true)]
    pub end: Option<i64>,

    /// Number of worker threads. Default: 1
    #[arg(long)]
    pub threads: Option<usize>,

    /// Stop after this many timeouts; 0 disables the limit. Default: 150
    #[arg(long)]
    pub max_timeouts: Option<usize>,

    /// Outcome(s) retried on the next run instead of counting as done. Default: TIMEOUT
    #[arg(long, num_args = 1.., value_parser = clap::value_parser!(Outcome))]
    pub retry: Vec<Outcome>,

    /// Subtitle language prefix. Default: ru
    #[arg(long)]
    pub sub_lang: Option<String>,

    /// Skip videos whose text or audio file already exists in the download directory.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub skip_existing: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Config file. Default: subgrab.toml in the current directory, if present.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}
