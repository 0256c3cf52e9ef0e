//! Application configuration constants.
//! Defaults, timeouts and queue sizing in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived file names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!("{pkg}.toml"),
            }
        })
    }

    /// Config file looked up in the working directory when `--config` is not given.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

/// Default locations used by the CLI.
pub struct DefaultPaths;

impl DefaultPaths {
    pub const MANIFEST: &'static str = "./step3.json";
    pub const LOG: &'static str = "./processed.log";
    pub const DOWNLOAD_DIR: &'static str = "./download";
}

// ---- Fetching ----

/// Time budgets for the external retrieval steps.
pub struct FetchTimeouts;

impl FetchTimeouts {
    pub const SUBTITLES: Duration = Duration::from_secs(10);
    pub const POST_PROCESS: Duration = Duration::from_secs(5);
    pub const AUDIO: Duration = Duration::from_secs(180);
    /// How often a running child process is polled for exit.
    pub const POLL_INTERVAL: Duration = Duration::from_millis(50);
    pub const DEFAULT_SUB_LANG: &'static str = "ru";
}

/// Artifact file names inside `<download_dir>/<item id>/`.
pub struct ArtifactNames;

impl ArtifactNames {
    /// `--output` template stem for subtitles; yt-dlp appends `.<lang>.srt`.
    pub const SUBTITLES_STEM: &'static str = "subtitles";
    pub const AUDIO_STEM: &'static str = "audio";
    pub const AUDIO_FILE: &'static str = "audio.mp3";
    pub const TEXT_FILE: &'static str = "text.txt";
}

// ---- Pipeline ----

/// Submission and result queues hold `QUEUE_FACTOR * workers` entries.
pub const QUEUE_FACTOR: usize = 2;

/// How often blocking loops (submission, pacing sleep) re-check the cancel token.
pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(100);
