//! ShellSession - one long-lived shell process per session id

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use nix::sys::signal::Signal;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::tools::ToolError;

/// Output of one command run through a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Everything the command printed, stderr merged in
    pub output: String,
    /// Exit status of the command, -1 on timeout
    pub exit_code: i32,
    pub timed_out: bool,
    /// Working directory of the shell after the command
    pub cwd: PathBuf,
}

/// Running shell process and its pipes
struct ShellProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// How a read of command output ended
enum ReadOutcome {
    /// Marker seen: exit code and the shell's $PWD
    Done { exit_code: i32, cwd: Option<PathBuf> },
    /// Shell closed its stdout (e.g. `exit`)
    Eof,
}

/// A persistent shell keyed by session id
///
/// The process is started lazily on the first command and restarted
/// transparently after it dies or is killed on timeout. A restarted shell
/// begins in the last known directory with the environment snapshot taken when
/// the session was created, so variables exported earlier are gone.
pub struct ShellSession {
    id: String,
    program: PathBuf,
    cwd: PathBuf,
    env: HashMap<OsString, OsString>,
    sentinel: String,
    kill_grace: Duration,
    process: Option<ShellProcess>,
}

impl ShellSession {
    /// Create a session; no process is spawned until the first command
    pub fn new(id: impl Into<String>, program: impl Into<PathBuf>, cwd: impl Into<PathBuf>, kill_grace: Duration) -> Self {
        let id = id.into();
        let sentinel = format!("__CA_DONE_{}__", Uuid::now_v7().simple());
        debug!(%id, %sentinel, "ShellSession::new: called");
        Self {
            id,
            program: program.into(),
            cwd: cwd.into(),
            env: std::env::vars_os().collect(),
            sentinel,
            kill_grace,
            process: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last known working directory of the shell
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Whether a shell process is currently alive
    pub fn is_running(&mut self) -> bool {
        match self.process.as_mut() {
            Some(process) => matches!(process.child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Run one command and wait for it, at most `timeout`
    ///
    /// A timeout is not an error: the shell's process group is killed and the
    /// partial output comes back with `timed_out` set and exit code -1.
    pub async fn execute(&mut self, command: &str, timeout: Duration) -> Result<CommandOutput, ToolError> {
        debug!(session = %self.id, %command, ?timeout, "ShellSession::execute: called");
        if !self.is_running() {
            self.start().await?;
        }

        let script = self.wrap(command);
        let Some(process) = self.process.as_mut() else {
            return Err(ToolError::Shell("shell process not available".into()));
        };

        if let Err(e) = write_script(&mut process.stdin, &script).await {
            warn!(session = %self.id, %e, "Failed to write to shell, discarding process");
            self.process = None;
            return Err(ToolError::Shell(format!("Failed to write to shell: {}", e)));
        }

        let mut output = String::new();
        let mut pending = Vec::new();
        let read = tokio::time::timeout(
            timeout,
            read_until_sentinel(&mut process.stdout, &self.sentinel, &mut output, &mut pending),
        )
        .await;

        match read {
            Ok(Ok(ReadOutcome::Done { exit_code, cwd })) => {
                debug!(session = %self.id, exit_code, "ShellSession::execute: command completed");
                if let Some(cwd) = cwd {
                    self.cwd = cwd;
                }
                Ok(CommandOutput {
                    output,
                    exit_code,
                    timed_out: false,
                    cwd: self.cwd.clone(),
                })
            }
            Ok(Ok(ReadOutcome::Eof)) => {
                let exit_code = match process.child.wait().await {
                    Ok(status) => status.code().unwrap_or(-1),
                    Err(e) => {
                        warn!(session = %self.id, %e, "Failed to collect shell exit status");
                        -1
                    }
                };
                info!(session = %self.id, exit_code, "Shell exited");
                self.process = None;
                Ok(CommandOutput {
                    output,
                    exit_code,
                    timed_out: false,
                    cwd: self.cwd.clone(),
                })
            }
            Ok(Err(e)) => {
                warn!(session = %self.id, %e, "Failed to read shell output");
                self.terminate().await;
                Err(ToolError::Shell(format!("Failed to read shell output: {}", e)))
            }
            Err(_) => {
                warn!(session = %self.id, ?timeout, "Command timed out, killing shell");
                self.terminate().await;
                // Unterminated last line, e.g. a progress indicator
                output.push_str(&String::from_utf8_lossy(&pending));
                if !output.is_empty() && !output.ends_with('\n') {
                    output.push('\n');
                }
                output.push_str(&format!("Command timed out after {}ms", timeout.as_millis()));
                Ok(CommandOutput {
                    output,
                    exit_code: -1,
                    timed_out: true,
                    cwd: self.cwd.clone(),
                })
            }
        }
    }

    /// Kill the shell and everything it started in the foreground
    pub async fn terminate(&mut self) {
        let Some(mut process) = self.process.take() else {
            debug!(session = %self.id, "ShellSession::terminate: no process");
            return;
        };

        if let Some(pid) = process.child.id() {
            let pgid = pid as i32;
            debug!(session = %self.id, pgid, "ShellSession::terminate: sending SIGTERM to process group");
            super::signal_group(pgid, Signal::SIGTERM);
            if tokio::time::timeout(self.kill_grace, process.child.wait()).await.is_err() {
                warn!(session = %self.id, pgid, "Shell did not stop gracefully, sending SIGKILL");
            }
            // Sweep anything in the group that outlived the shell
            super::signal_group(pgid, Signal::SIGKILL);
        }
        if let Ok(None) = process.child.try_wait()
            && let Err(e) = process.child.kill().await
        {
            warn!(session = %self.id, %e, "Failed to kill shell");
        }
        info!(session = %self.id, "Shell session terminated");
    }

    async fn start(&mut self) -> Result<(), ToolError> {
        info!(session = %self.id, program = %self.program.display(), cwd = %self.cwd.display(), "Starting shell");

        let mut child = Command::new(&self.program)
            .current_dir(&self.cwd)
            .env_clear()
            .envs(&self.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .process_group(0)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolError::Shell(format!("Failed to start {}: {}", self.program.display(), e)))?;

        let (Some(mut stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(ToolError::Shell("shell pipes not available".into()));
        };

        write_script(&mut stdin, "exec 2>&1\n")
            .await
            .map_err(|e| ToolError::Shell(format!("Failed to initialize shell: {}", e)))?;

        self.process = Some(ShellProcess {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        });
        Ok(())
    }

    /// Command wrapped so it cannot eat the marker from stdin, followed by the marker line
    fn wrap(&self, command: &str) -> String {
        format!(
            "{{\n{}\n}} < /dev/null\n__ca_status=$?; printf '%s %s %s\\n' '{}' \"$__ca_status\" \"$PWD\"\n",
            command, self.sentinel
        )
    }
}

async fn write_script(stdin: &mut ChildStdin, script: &str) -> std::io::Result<()> {
    stdin.write_all(script.as_bytes()).await?;
    stdin.flush().await
}

/// Collect lines into `output` until the marker line appears
///
/// Text in front of the marker on the same line belongs to the command
/// (output without a trailing newline). `buf` holds the line being read,
/// so a caller that gives up waiting still has the unterminated tail.
async fn read_until_sentinel(
    reader: &mut BufReader<ChildStdout>,
    sentinel: &str,
    output: &mut String,
    buf: &mut Vec<u8>,
) -> std::io::Result<ReadOutcome> {
    loop {
        buf.clear();
        if reader.read_until(b'\n', buf).await? == 0 {
            return Ok(ReadOutcome::Eof);
        }

        let line = String::from_utf8_lossy(buf);
        if let Some(pos) = line.find(sentinel) {
            output.push_str(&line[..pos]);
            return Ok(parse_marker(&line[pos + sentinel.len()..]));
        }
        output.push_str(&line);
    }
}

/// Parse `" <exit_code> <pwd>\n"` following the marker
fn parse_marker(rest: &str) -> ReadOutcome {
    let rest = rest.trim_start().trim_end_matches(['\n', '\r']);
    let (code, pwd) = rest.split_once(' ').unwrap_or((rest, ""));
    ReadOutcome::Done {
        exit_code: code.trim().parse().unwrap_or(-1),
        cwd: (!pwd.is_empty()).then(|| PathBuf::from(pwd)),
    }
}
