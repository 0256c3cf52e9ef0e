//! Public and internal types for the subgrab API and pipeline.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::config::{DefaultPaths, FetchTimeouts};

/// One unit of work: a remote video to fetch subtitles and/or audio for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    /// Stable external identifier (the video id). Also the artifact directory name.
    pub id: String,
    /// URL handed to the retrieval tool.
    pub locator: String,
    /// Length of the video, when the manifest records one.
    pub duration: Option<Duration>,
}

/// Error for a textual mode/outcome that matches no known variant.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Retrieval strategy for a whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DownloadMode {
    #[default]
    SubtitlesOnly,
    AudioOnly,
    /// Subtitles first; audio only when subtitles fail.
    SubtitlesOrAudio,
    /// Both artifacts are required.
    SubtitlesAndAudio,
}

impl DownloadMode {
    pub const ALL: [DownloadMode; 4] = [
        DownloadMode::SubtitlesOnly,
        DownloadMode::AudioOnly,
        DownloadMode::SubtitlesOrAudio,
        DownloadMode::SubtitlesAndAudio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadMode::SubtitlesOnly => "SUBTITLES_ONLY",
            DownloadMode::AudioOnly => "AUDIO_ONLY",
            DownloadMode::SubtitlesOrAudio => "SUBTITLES_OR_AUDIO",
            DownloadMode::SubtitlesAndAudio => "SUBTITLES_AND_AUDIO",
        }
    }
}

impl fmt::Display for DownloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownloadMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DownloadMode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "download mode",
                value: s.to_string(),
                expected: "SUBTITLES_ONLY, AUDIO_ONLY, SUBTITLES_OR_AUDIO, SUBTITLES_AND_AUDIO",
            })
    }
}

/// Terminal result for one item. Written to the resume log as `id,OUTCOME`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Failed,
    SubtitlesDownloaded,
    AudioDownloaded,
    SubtitlesAndAudioDownloaded,
    /// A retrieval step ran past its time budget. Counted by the circuit breaker.
    Timeout,
}

impl Outcome {
    pub const ALL: [Outcome; 5] = [
        Outcome::Failed,
        Outcome::SubtitlesDownloaded,
        Outcome::AudioDownloaded,
        Outcome::SubtitlesAndAudioDownloaded,
        Outcome::Timeout,
    ];

    /// Form written to the log. Short names keep logs from earlier runs readable.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Failed => "FAILED",
            Outcome::SubtitlesDownloaded => "SUBTITLES",
            Outcome::AudioDownloaded => "AUDIO",
            Outcome::SubtitlesAndAudioDownloaded => "SUBTITLES_AUDIO",
            Outcome::Timeout => "TIMEOUT",
        }
    }

    fn long_name(&self) -> &'static str {
        match self {
            Outcome::SubtitlesDownloaded => "SUBTITLES_DOWNLOADED",
            Outcome::AudioDownloaded => "AUDIO_DOWNLOADED",
            Outcome::SubtitlesAndAudioDownloaded => "SUBTITLES_AND_AUDIO_DOWNLOADED",
            other => other.as_str(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed | Outcome::Timeout)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Outcome::ALL
            .into_iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(s) || o.long_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError {
                kind: "outcome",
                value: s.to_string(),
                expected: "FAILED, SUBTITLES, AUDIO, SUBTITLES_AUDIO, TIMEOUT",
            })
    }
}

/// Result of a single fetch collaborator call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchStatus {
    Success,
    Failed,
    TimedOut,
}

impl FetchStatus {
    pub fn from_success(ok: bool) -> Self {
        if ok {
            FetchStatus::Success
        } else {
            FetchStatus::Failed
        }
    }
}

/// Outcomes that do not mark an item as done when found in the resume log.
pub type RetrySet = HashSet<Outcome>;

/// Retry-set used when none is configured: only timeouts are retried.
pub fn default_retry_set() -> RetrySet {
    HashSet::from([Outcome::Timeout])
}

/// 1-based inclusive range over the flattened manifest descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineRange {
    /// First line to process. 0 and 1 both mean the first descriptor.
    pub start: usize,
    /// Last line to process, or `None` for no upper bound.
    pub end: Option<usize>,
}

impl Default for LineRange {
    fn default() -> Self {
        Self {
            start: 0,
            end: None,
        }
    }
}

impl LineRange {
    /// Build from CLI-style values where a negative `end` means unbounded.
    pub fn from_cli(start: usize, end: i64) -> Self {
        Self {
            start,
            end: usize::try_from(end).ok(),
        }
    }

    /// Replace only the bounds that are given; a negative `end` clears the upper bound.
    pub fn with_overrides(self, start: Option<usize>, end: Option<i64>) -> Self {
        Self {
            start: start.unwrap_or(self.start),
            end: end.map_or(self.end, |e| usize::try_from(e).ok()),
        }
    }

    pub fn contains(&self, line: usize) -> bool {
        line >= self.start && !self.is_past_end(line)
    }

    pub fn is_past_end(&self, line: usize) -> bool {
        self.end.is_some_and(|end| line > end)
    }
}

/// Settings for the `yt-dlp` fetcher.
#[derive(Clone, Debug)]
pub struct FetchOpts {
    /// Artifacts go to `<download_dir>/<item id>/`.
    pub download_dir: PathBuf,
    /// Subtitle language prefix passed to `--sub-lang`.
    pub sub_lang: String,
    pub subtitles_timeout: Duration,
    pub post_process_timeout: Duration,
    pub audio_timeout: Duration,
}

impl Default for FetchOpts {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from(DefaultPaths::DOWNLOAD_DIR),
            sub_lang: FetchTimeouts::DEFAULT_SUB_LANG.to_string(),
            subtitles_timeout: FetchTimeouts::SUBTITLES,
            post_process_timeout: FetchTimeouts::POST_PROCESS,
            audio_timeout: FetchTimeouts::AUDIO,
        }
    }
}

/// Full run options (CLI, config file, driver).
#[derive(Clone, Debug)]
pub struct Opts {
    pub manifest_path: PathBuf,
    pub log_path: PathBuf,
    pub mode: DownloadMode,
    /// Pacing between submissions, whole seconds. `sleep_max == 0` disables it.
    pub sleep_min: u64,
    pub sleep_max: u64,
    pub range: LineRange,
    pub workers: usize,
    /// Circuit breaker ceiling. 0 disables the breaker.
    pub max_timeouts: usize,
    pub retry: RetrySet,
    /// Skip items whose artifacts are already on disk even if the log does not list them.
    pub skip_existing: bool,
    /// Show a progress counter and debug logging.
    pub verbose: bool,
    pub fetch: FetchOpts,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from(DefaultPaths::MANIFEST),
            log_path: PathBuf::from(DefaultPaths::LOG),
            mode: DownloadMode::default(),
            sleep_min: 0,
            sleep_max: 5,
            range: LineRange::default(),
            workers: 1,
            max_timeouts: 150,
            retry: default_retry_set(),
            skip_existing: false,
            verbose: false,
            fetch: FetchOpts::default(),
        }
    }
}
