//! SRT → plain text: drop cue numbers, timing lines, markup and blank lines.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn timing_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d{2}:\d{2}:\d{2}[.,]\d{3} --> \d{2}:\d{2}:\d{2}[.,]\d{3}").expect("static regex")
    })
}

fn cue_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,3}$").expect("static regex"))
}

fn markup() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"))
}

/// Plain text of an SRT document, one caption line per output line.
pub fn clean_srt(srt: &str) -> String {
    let mut out = String::with_capacity(srt.len() / 2);
    for line in srt.lines() {
        let line = line.trim_end_matches('\r');
        if timing_line().is_match(line) || cue_number().is_match(line.trim()) {
            continue;
        }
        let text = markup().replace_all(line, "");
        if text.trim().is_empty() {
            continue;
        }
        out.push_str(&text);
        out.push('\n');
    }
    out
}

/// Read `srt_path`, write its cleaned text to `text_path`.
pub fn post_process_srt(srt_path: &Path, text_path: &Path) -> Result<()> {
    let raw = std::fs::read(srt_path).with_context(|| format!("read {}", srt_path.display()))?;
    let text = clean_srt(&String::from_utf8_lossy(&raw));
    std::fs::write(text_path, text).with_context(|| format!("write {}", text_path.display()))?;
    Ok(())
}
