//! Run an external command with a wall-clock limit.

use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::FetchStatus;
use crate::utils::config::FetchTimeouts;

/// Spawn `cmd`, wait up to `timeout`, kill it on overrun.
/// Exit 0 → `Success`, other exit or spawn/wait error → `Failed`, overrun → `TimedOut`.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> FetchStatus {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let mut child = match cmd.stdin(Stdio::null()).spawn() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Failed to start {}: {}", program, e);
            return FetchStatus::Failed;
        }
    };
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    log::debug!("{} exited with {}", program, status);
                }
                return FetchStatus::from_success(status.success());
            }
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                log::debug!("{} killed after {:?}", program, timeout);
                return FetchStatus::TimedOut;
            }
            Ok(None) => thread::sleep(FetchTimeouts::POLL_INTERVAL),
            Err(e) => {
                log::warn!("Error waiting for {}: {}", program, e);
                let _ = child.kill();
                let _ = child.wait();
                return FetchStatus::Failed;
            }
        }
    }
}
