//! Per-item retrieval: which artifacts to fetch for a [`DownloadMode`] and the resulting [`Outcome`].
//!
//! A leg that ends in failure reports [`Outcome::Timeout`] instead of [`Outcome::Failed`] when any
//! call in it timed out, so the circuit breaker sees remote stalls even through fallbacks.

use crate::fetch::MediaFetcher;
use crate::{DownloadMode, FetchStatus, Item, Outcome};

/// Subtitle fetch, then post-processing. Post-processing only runs after a successful fetch.
fn subtitles_leg(fetcher: &dyn MediaFetcher, item: &Item) -> Outcome {
    let status = match fetcher.fetch_subtitles(item) {
        FetchStatus::Success => fetcher.post_process_subtitles(item),
        other => other,
    };
    leg_outcome(status, Outcome::SubtitlesDownloaded)
}

fn audio_leg(fetcher: &dyn MediaFetcher, item: &Item) -> Outcome {
    leg_outcome(fetcher.fetch_audio(item), Outcome::AudioDownloaded)
}

fn leg_outcome(status: FetchStatus, on_success: Outcome) -> Outcome {
    match status {
        FetchStatus::Success => on_success,
        FetchStatus::Failed => Outcome::Failed,
        FetchStatus::TimedOut => Outcome::Timeout,
    }
}

/// Failure of several legs: timeout wins over plain failure.
fn combine_failures(outcomes: &[Outcome]) -> Outcome {
    if outcomes.contains(&Outcome::Timeout) {
        Outcome::Timeout
    } else {
        Outcome::Failed
    }
}

/// Run the retrieval strategy for `mode` on one item.
pub fn retrieve(fetcher: &dyn MediaFetcher, item: &Item, mode: DownloadMode) -> Outcome {
    match mode {
        DownloadMode::SubtitlesOnly => subtitles_leg(fetcher, item),
        DownloadMode::AudioOnly => audio_leg(fetcher, item),
        DownloadMode::SubtitlesOrAudio => match subtitles_leg(fetcher, item) {
            Outcome::SubtitlesDownloaded => Outcome::SubtitlesDownloaded,
            subtitles => match audio_leg(fetcher, item) {
                Outcome::AudioDownloaded => Outcome::AudioDownloaded,
                audio => combine_failures(&[subtitles, audio]),
            },
        },
        DownloadMode::SubtitlesAndAudio => {
            let subtitles = subtitles_leg(fetcher, item);
            let audio = audio_leg(fetcher, item);
            if subtitles.is_success() && audio.is_success() {
                Outcome::SubtitlesAndAudioDownloaded
            } else {
                combine_failures(&[subtitles, audio])
            }
        }
    }
}
