//! Human-readable duration parsing (`1:02:03`, `12:30`, `1h 2m 3s`, `90 min`).

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("malformed duration `{0}`")]
    Malformed(String),
}

/// Number with optional fraction followed by a unit word.
fn unit_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*(hours?|hrs?|h|minutes?|mins?|m|seconds?|secs?|s)\s*,?")
            .expect("static regex")
    })
}

fn unit_seconds(unit: &str) -> f64 {
    match unit.to_ascii_lowercase().chars().next() {
        Some('h') => 3600.0,
        Some('m') => 60.0,
        _ => 1.0,
    }
}

/// `SS`, `MM:SS` or `HH:MM:SS`, last field may carry a fraction.
fn parse_clock(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let last = parts.len() - 1;
    let mut total = 0.0;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit() || (i == last && c == '.')) {
            return None;
        }
        let value: f64 = part.parse().ok()?;
        // Minutes and seconds below the leading field must be < 60.
        if i > 0 && value >= 60.0 {
            return None;
        }
        total = total * 60.0 + value;
    }
    Some(total)
}

fn parse_units(s: &str) -> Option<f64> {
    let re = unit_regex();
    let mut rest = s;
    let mut total = 0.0;
    let mut matched = false;
    while !rest.trim().is_empty() {
        let caps = re.captures(rest)?;
        let value: f64 = caps[1].parse().ok()?;
        total += value * unit_seconds(&caps[2]);
        matched = true;
        rest = &rest[caps[0].len()..];
    }
    matched.then_some(total)
}

/// Parse a manifest duration string.
pub fn parse_duration(s: &str) -> Result<Duration, DurationError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(DurationError::Empty);
    }
    parse_clock(trimmed)
        .or_else(|| parse_units(trimmed))
        // Too many digits overflow Duration; treat that like any other bad value.
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| DurationError::Malformed(s.to_string()))
}
