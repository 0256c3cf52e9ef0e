//! Read the resume log into the completed-set.

use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::{Outcome, RetrySet};

use super::{ResumeLogError, SEPARATOR};

/// Parse one log line (without newline) into `(id, outcome)`. `line_no` is 1-based, for errors.
pub fn parse_line(line: &str, line_no: usize) -> Result<(String, Outcome), ResumeLogError> {
    let malformed = |reason: String| ResumeLogError::Malformed {
        line: line_no,
        reason,
    };
    let (id, state) = line
        .rsplit_once(SEPARATOR)
        .ok_or_else(|| malformed(format!("missing `{SEPARATOR}` in `{line}`")))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(malformed("empty item id".to_string()));
    }
    let outcome = state.parse::<Outcome>().map_err(|e| malformed(e.to_string()))?;
    Ok((id.to_string(), outcome))
}

/// Scan every line of the log and keep the most recent outcome per item.
/// Missing file → empty map. Blank lines are skipped; any other bad line is an error.
pub fn load_latest_outcomes(path: &Path) -> Result<HashMap<String, Outcome>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("open resume log {}", path.display()));
        }
    };
    let mut latest = HashMap::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("read resume log {}", path.display()))?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let (id, outcome) = parse_line(line, idx + 1)
            .with_context(|| format!("resume log {}", path.display()))?;
        latest.insert(id, outcome);
    }
    Ok(latest)
}

/// Ids whose latest recorded outcome is not in `retry`: these are done and must not be resubmitted.
pub fn load_completed(path: &Path, retry: &RetrySet) -> Result<HashSet<String>> {
    let latest = load_latest_outcomes(path)?;
    let total = latest.len();
    let completed: HashSet<String> = latest
        .into_iter()
        .filter(|(_, outcome)| !retry.contains(outcome))
        .map(|(id, _)| id)
        .collect();
    log::debug!(
        "Resume log {}: {} items recorded, {} completed, {} to retry",
        path.display(),
        total,
        completed.len(),
        total - completed.len()
    );
    Ok(completed)
}
