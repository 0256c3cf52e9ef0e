//! Resume log: append-only `item_id,OUTCOME` lines; loaded once at startup, appended by the writer.

mod load;
mod log_file;

pub use load::{load_completed, load_latest_outcomes, parse_line};
pub use log_file::ResumeLog;

/// Field separator inside a log line.
pub(crate) const SEPARATOR: char = ',';

/// Integrity errors found while reading the log. I/O errors go through `anyhow` context instead.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResumeLogError {
    #[error("resume log line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("item id `{0}` cannot be written to the resume log")]
    InvalidId(String),
}
