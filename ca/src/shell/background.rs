//! Background jobs - detached commands backed by a log file and a pid file

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::ShellSession;
use crate::tools::ToolError;

/// A job launched with `run_in_background`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackgroundJob {
    pub id: String,
    pub pid: i32,
    pub log_file: PathBuf,
    pub pid_file: PathBuf,
}

/// Fresh job id of the form `bg_<uuid-v7>`
pub fn new_job_id() -> String {
    format!("bg_{}", Uuid::now_v7().simple())
}

/// Job ids become file names, so only `[A-Za-z0-9_-]` is allowed
pub fn validate_job_id(id: &str) -> Result<(), ToolError> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(ToolError::InvalidArgument(format!("Invalid job id: {}", id)));
    }
    Ok(())
}

pub fn log_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{}.log", id))
}

pub fn pid_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{}.pid", id))
}

/// Quote `s` for a POSIX shell as one single-quoted word
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Shell line that detaches `command` in its own process group and prints its pid
fn launch_script(program: &Path, command: &str, log_file: &Path) -> String {
    format!(
        "(set -m; nohup {} -c {} > {} 2>&1 < /dev/null & echo $!)",
        shell_quote(&program.to_string_lossy()),
        shell_quote(command),
        shell_quote(&log_file.to_string_lossy()),
    )
}

/// Last line of launcher output that is a pid
fn parse_pid(output: &str) -> Option<i32> {
    output.lines().rev().find_map(|line| line.trim().parse().ok())
}

/// Start `command` detached from the session and record its pid
///
/// The job inherits the session's working directory and environment.
pub async fn launch(
    session: &mut ShellSession,
    program: &Path,
    dir: &Path,
    command: &str,
    timeout: Duration,
) -> Result<BackgroundJob, ToolError> {
    let id = new_job_id();
    let log_file = log_path(dir, &id);
    let pid_file = pid_path(dir, &id);
    debug!(%id, log_file = %log_file.display(), "launch: called");

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ToolError::io("Failed to create directory", dir, e))?;

    let out = session.execute(&launch_script(program, command, &log_file), timeout).await?;
    let pid = parse_pid(&out.output)
        .ok_or_else(|| ToolError::Shell(format!("Failed to start background job: {}", out.output.trim())))?;

    tokio::fs::write(&pid_file, format!("{}\n", pid))
        .await
        .map_err(|e| ToolError::io("Failed to write", &pid_file, e))?;

    info!(%id, pid, "Background job started");
    Ok(BackgroundJob {
        id,
        pid,
        log_file,
        pid_file,
    })
}

/// Pid recorded for a job, if its pid file exists and parses
pub async fn read_pid(dir: &Path, id: &str) -> Option<i32> {
    let content = tokio::fs::read_to_string(pid_path(dir, id)).await.ok()?;
    content.trim().parse().ok()
}

/// Whether the job's process is still alive; None when no pid was recorded
pub async fn is_running(dir: &Path, id: &str) -> Option<bool> {
    read_pid(dir, id).await.map(super::is_process_running)
}

/// Stop a job by id and remove its pid file
///
/// Returns the pid and whether it was still running, or None when the id
/// has no pid file.
pub async fn terminate(dir: &Path, id: &str, grace: Duration) -> Option<(i32, bool)> {
    let pid = read_pid(dir, id).await?;
    let was_running = super::terminate_process_group(pid, grace).await;

    let pid_file = pid_path(dir, id);
    if let Err(e) = tokio::fs::remove_file(&pid_file).await {
        debug!(%id, %e, "terminate: failed to remove pid file");
    }
    info!(%id, pid, was_running, "Background job stopped");
    Some((pid, was_running))
}
