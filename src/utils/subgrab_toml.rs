//! Load `subgrab.toml` (CLI only). Lib callers build [`Opts`] directly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{Opts, Outcome};

#[derive(Debug, Default, Deserialize)]
pub struct SubgrabToml {
    #[serde(default)]
    settings: RunSection,
}

#[derive(Debug, Default, Deserialize)]
struct RunSection {
    manifest: Option<String>,
    log: Option<String>,
    download_dir: Option<String>,
    mode: Option<String>,
    sleep_min: Option<u64>,
    sleep_max: Option<u64>,
    start: Option<usize>,
    end: Option<i64>,
    threads: Option<usize>,
    max_timeouts: Option<usize>,
    retry: Option<Vec<String>>,
    sub_lang: Option<String>,
    skip_existing: Option<bool>,
    verbose: Option<bool>,
}

/// Load the config file. With `explicit`, a missing or broken file is an error;
/// otherwise `subgrab.toml` in `dir` is read if present and ignored (with a warning) if broken.
pub fn load_subgrab_toml(dir: &Path, explicit: Option<&Path>) -> Result<Option<SubgrabToml>> {
    if let Some(path) = explicit {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let parsed = toml::from_str(&s).with_context(|| format!("parse config {}", path.display()))?;
        return Ok(Some(parsed));
    }
    let path = dir.join(crate::utils::PackagePaths::get().config_filename());
    let Ok(s) = std::fs::read_to_string(&path) else {
        return Ok(None);
    };
    Ok(toml::from_str(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok())
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $($opts_field:ident).+) => {
        if let Some(v) = $sec.$sec_field.clone() {
            $opts.$($opts_field).+ = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub fn apply_file_to_opts(file: &SubgrabToml, opts: &mut Opts) -> Result<()> {
    let sec = &file.settings;
    if let Some(ref p) = sec.manifest {
        opts.manifest_path = PathBuf::from(p);
    }
    if let Some(ref p) = sec.log {
        opts.log_path = PathBuf::from(p);
    }
    if let Some(ref p) = sec.download_dir {
        opts.fetch.download_dir = PathBuf::from(p);
    }
    if let Some(ref m) = sec.mode {
        opts.mode = m.parse().context("config `mode`")?;
    }
    apply_file_opt!(sec, opts, sleep_min => sleep_min);
    apply_file_opt!(sec, opts, sleep_max => sleep_max);
    opts.range = opts.range.with_overrides(sec.start, sec.end);
    apply_file_opt!(sec, opts, threads => workers);
    apply_file_opt!(sec, opts, max_timeouts => max_timeouts);
    if let Some(ref retry) = sec.retry {
        opts.retry = retry
            .iter()
            .map(|s| s.parse::<Outcome>())
            .collect::<Result<_, _>>()
            .context("config `retry`")?;
    }
    apply_file_opt!(sec, opts, sub_lang => fetch.sub_lang);
    apply_file_opt!(sec, opts, skip_existing => skip_existing);
    apply_file_opt!(sec, opts, verbose => verbose);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DownloadMode, LineRange};

    #[test]
    fn test_apply_file_overrides_only_present_fields() {
        let file: SubgrabToml = toml::from_str(
            r#"
            [settings]
            mode = "AUDIO_ONLY"
            threads = 6
            end = 40
            retry = ["TIMEOUT", "FAILED"]
            "#,
        )
        .unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts).unwrap();
        assert_eq!(opts.mode, DownloadMode::AudioOnly);
        assert_eq!(opts.workers, 6);
        assert_eq!(opts.range, LineRange { start: 0, end: Some(40) });
        assert!(opts.retry.contains(&Outcome::Failed));
        assert_eq!(opts.max_timeouts, Opts::default().max_timeouts);
    }

    #[test]
    fn test_apply_file_rejects_unknown_mode() {
        let file: SubgrabToml = toml::from_str("[settings]\nmode = \"VIDEO\"\n").unwrap();
        let mut opts = Opts::default();
        assert!(apply_file_to_opts(&file, &mut opts).is_err());
    }
}
