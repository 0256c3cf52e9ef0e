//! [`MediaFetcher`] backed by the `yt-dlp` command-line tool.

use crossbeam_channel::{RecvTimeoutError, bounded};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use crate::utils::config::ArtifactNames;
use crate::{FetchOpts, FetchStatus, Item};

use super::MediaFetcher;
use super::process::run_with_timeout;
use super::subtitles::post_process_srt;

const YT_DLP: &str = "yt-dlp";

/// True if the item already has a text or audio artifact under `download_dir`.
pub fn artifacts_exist(download_dir: &Path, id: &str) -> bool {
    let dir = download_dir.join(id);
    dir.join(ArtifactNames::TEXT_FILE).exists() || dir.join(ArtifactNames::AUDIO_FILE).exists()
}

pub struct YtDlpFetcher {
    opts: FetchOpts,
}

impl YtDlpFetcher {
    pub fn new(opts: FetchOpts) -> Self {
        Self { opts }
    }

    fn item_dir(&self, item: &Item) -> PathBuf {
        self.opts.download_dir.join(&item.id)
    }

    /// Raw subtitle path as produced by `--convert-subs srt`.
    fn srt_path(&self, item: &Item) -> PathBuf {
        self.item_dir(item).join(format!(
            "{}.{}.srt",
            ArtifactNames::SUBTITLES_STEM,
            self.opts.sub_lang
        ))
    }

    fn base_command(&self, item: &Item, stem: &str) -> Command {
        let mut cmd = Command::new(YT_DLP);
        cmd.arg("--quiet")
            .arg("--output")
            .arg(self.item_dir(item).join(stem))
            .stdout(Stdio::null());
        cmd
    }

    /// Exit status combined with the expected artifact being on disk.
    fn check_artifact(status: FetchStatus, artifact: &Path) -> FetchStatus {
        match status {
            FetchStatus::Success if !artifact.exists() => {
                log::debug!("Expected artifact missing: {}", artifact.display());
                FetchStatus::Failed
            }
            other => other,
        }
    }
}

impl MediaFetcher for YtDlpFetcher {
    fn fetch_subtitles(&self, item: &Item) -> FetchStatus {
        let mut cmd = self.base_command(item, ArtifactNames::SUBTITLES_STEM);
        cmd.args(["--skip-download", "--write-subs", "--write-auto-subs"])
            .arg("--sub-lang")
            .arg(format!("{}*", self.opts.sub_lang))
            .args(["--sub-format", "ttml", "--convert-subs", "srt"])
            .arg(&item.locator);
        let status = run_with_timeout(&mut cmd, self.opts.subtitles_timeout);
        Self::check_artifact(status, &self.srt_path(item))
    }

    fn post_process_subtitles(&self, item: &Item) -> FetchStatus {
        let srt = self.srt_path(item);
        let text = self.item_dir(item).join(ArtifactNames::TEXT_FILE);
        let (tx, rx) = bounded(1);
        let (srt_w, text_w) = (srt.clone(), text.clone());
        thread::spawn(move || {
            let _ = tx.send(post_process_srt(&srt_w, &text_w));
        });
        match rx.recv_timeout(self.opts.post_process_timeout) {
            Ok(Ok(())) => Self::check_artifact(FetchStatus::Success, &text),
            Ok(Err(e)) => {
                log::warn!("Subtitle post-processing for {} failed: {:#}", item.id, e);
                FetchStatus::Failed
            }
            Err(RecvTimeoutError::Timeout) => FetchStatus::TimedOut,
            Err(RecvTimeoutError::Disconnected) => FetchStatus::Failed,
        }
    }

    fn fetch_audio(&self, item: &Item) -> FetchStatus {
        let mut cmd = self.base_command(item, ArtifactNames::AUDIO_STEM);
        cmd.args(["--extract-audio", "--audio-quality", "128K", "--audio-format", "mp3"])
            .arg(&item.locator);
        let status = run_with_timeout(&mut cmd, self.opts.audio_timeout);
        Self::check_artifact(
            status,
            &self.item_dir(item).join(ArtifactNames::AUDIO_FILE),
        )
    }
}
