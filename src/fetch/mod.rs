//! Fetch collaborators: the [`MediaFetcher`] seam and its `yt-dlp` implementation.

pub mod process;
pub mod subtitles;
pub mod ytdlp;

pub use process::run_with_timeout;
pub use subtitles::{clean_srt, post_process_srt};
pub use ytdlp::{YtDlpFetcher, artifacts_exist};

use crate::{FetchStatus, Item};

/// The three retrieval steps the pipeline drives for each item.
///
/// Implementations must bound each call by their own timeout and report an overrun as
/// [`FetchStatus::TimedOut`]; the pipeline never interrupts a call in flight.
pub trait MediaFetcher: Send + Sync {
    /// Download the raw subtitle file for `item`.
    fn fetch_subtitles(&self, item: &Item) -> FetchStatus;
    /// Turn the raw subtitle file into plain text. Only called after a successful subtitle fetch.
    fn post_process_subtitles(&self, item: &Item) -> FetchStatus;
    /// Download the audio track for `item`.
    fn fetch_audio(&self, item: &Item) -> FetchStatus;
}
