use colored::{ColoredString, Colorize};
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::fmt::Display;
use std::io::Write;
use std::thread;

use crate::Outcome;

/// One log line: `[time subgrab thread] msg`, with level and target added for warnings and errors.
/// The thread name tells worker and writer lines apart; the main thread is left out.
fn format_line(
    timestamp: impl Display,
    thread: Option<&str>,
    level: Level,
    target: &str,
    args: impl Display,
) -> String {
    let name = env!("CARGO_PKG_NAME").cyan();
    let origin = match thread {
        Some(t) if t != "main" => format!("{} {}", name, t.dimmed()),
        _ => name.to_string(),
    };
    match level {
        Level::Error | Level::Warn => {
            let level_str = if level == Level::Warn {
                "WARN".yellow()
            } else {
                "ERROR".red()
            };
            format!(
                "[{} {} {} {}] {}",
                timestamp,
                origin,
                level_str,
                target.white(),
                args
            )
        }
        _ => format!("[{} {}] {}", timestamp, origin, args),
    }
}

pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // try_init: tests and embedding programs may already have a logger installed.
    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn) // Default: only warnings from dependencies
        .filter_module(env!("CARGO_PKG_NAME"), level) // Our crate: use requested level
        .format(|buf, record| {
            let line = format_line(
                buf.timestamp_seconds(),
                thread::current().name(),
                record.level(),
                record.target(),
                record.args(),
            );
            writeln!(buf, "{}", line)
        })
        .try_init();
}

/// Colors for outcome reporting.
pub struct Colors;

impl Colors {
    /// Outcome label colored by severity: green for downloads, red for failures, yellow for timeouts.
    pub fn outcome(outcome: Outcome) -> ColoredString {
        match outcome {
            Outcome::Failed => outcome.as_str().red(),
            Outcome::Timeout => outcome.as_str().yellow(),
            _ => outcome.as_str().green(),
        }
    }
}
