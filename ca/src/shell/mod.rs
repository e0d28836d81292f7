//! Persistent shell sessions and background jobs
//!
//! A `ShellSession` owns one long-lived shell process. Commands are written to
//! its stdin followed by a marker line; everything the shell prints up to that
//! marker is the command's output. Background jobs are detached processes whose
//! output and pid live in files under the configured background directory.

pub mod background;
mod session;

use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill, killpg};
use nix::unistd::Pid;
use tracing::{debug, warn};

pub use background::BackgroundJob;
pub use session::{CommandOutput, ShellSession};

/// Interval between liveness checks while waiting for a process to exit
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Cut `output` to `max_chars` characters, appending a marker with the original length
pub fn truncate_output(output: &str, max_chars: usize) -> String {
    let total = output.chars().count();
    if total <= max_chars {
        return output.to_string();
    }

    debug!(total, max_chars, "truncate_output: truncating");
    let kept: String = output.chars().take(max_chars).collect();
    format!("{}\n... (output truncated, {} total characters)", kept, total)
}

/// Whether a process with this pid exists
pub fn is_process_running(pid: i32) -> bool {
    // Sending signal 0 checks if the process exists without affecting it
    kill(Pid::from_raw(pid), None).is_ok()
}

/// Send `signal` to the process group `pgid`; false when the group is gone
pub fn signal_group(pgid: i32, signal: Signal) -> bool {
    match killpg(Pid::from_raw(pgid), signal) {
        Ok(()) => true,
        Err(Errno::ESRCH) => {
            debug!(pgid, ?signal, "signal_group: no such process group");
            false
        }
        Err(e) => {
            warn!(pgid, ?signal, %e, "Failed to signal process group");
            false
        }
    }
}

/// Stop a detached process led by `pid`: SIGTERM, wait up to `grace`, then SIGKILL
///
/// The whole process group is signalled; when `pid` leads no group only the
/// process itself is. Returns false when nothing was running.
pub async fn terminate_process_group(pid: i32, grace: Duration) -> bool {
    debug!(pid, ?grace, "terminate_process_group: called");
    if !is_process_running(pid) {
        debug!(pid, "terminate_process_group: not running");
        return false;
    }

    send(pid, Signal::SIGTERM);

    let deadline = tokio::time::Instant::now() + grace;
    while is_process_running(pid) && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    if is_process_running(pid) {
        warn!(pid, "Process did not stop gracefully, sending SIGKILL");
        send(pid, Signal::SIGKILL);
    }
    true
}

fn send(pid: i32, signal: Signal) {
    if !signal_group(pid, signal)
        && let Err(e) = kill(Pid::from_raw(pid), signal)
    {
        debug!(pid, ?signal, %e, "send: kill failed");
    }
}
