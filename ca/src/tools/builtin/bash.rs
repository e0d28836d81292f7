//! Bash tool - execute commands in a persistent shell session

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::shell::{background, truncate_output};
use crate::tools::params::{optional_bool, optional_str, optional_usize, required_str};
use crate::tools::{Tool, ToolContext, ToolError};

/// Bound on the launcher command of a background job
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Execute a shell command; cwd and exported variables persist per `shell_id`
pub struct BashTool;

#[async_trait]
impl Tool for BashTool {
    fn name(&self) -> &'static str {
        "Bash"
    }

    fn description(&self) -> &'static str {
        "Execute a bash command in a persistent shell session. Working directory and environment \
         variables persist between calls with the same shell_id. stderr is merged into the output. \
         Output longer than 30000 characters is truncated. Use run_in_background for long-running \
         processes and read their output with BashOutput."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The command to execute"
                },
                "timeout": {
                    "type": "integer",
                    "description": "Timeout in milliseconds (default: 120000, max: 600000)"
                },
                "description": {
                    "type": "string",
                    "description": "Short description of what the command does"
                },
                "run_in_background": {
                    "type": "boolean",
                    "description": "Start the command detached and return a job id (default: false)"
                },
                "shell_id": {
                    "type": "string",
                    "description": "Shell session to run in (default: \"default\")"
                }
            },
            "required": ["command"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let command = required_str(input, "command")?;
        if command.trim().is_empty() {
            return Err(ToolError::InvalidArgument("command must not be empty".into()));
        }

        let shell = &ctx.config.shell;
        let timeout_ms = match optional_usize(input, "timeout")? {
            Some(0) => return Err(ToolError::InvalidArgument("timeout must be positive".into())),
            Some(ms) => (ms as u64).min(shell.max_timeout_ms),
            None => shell.default_timeout_ms,
        };
        let run_in_background = optional_bool(input, "run_in_background", false)?;
        let shell_id = optional_str(input, "shell_id")?.unwrap_or(shell.default_session.as_str());
        debug!(%command, timeout_ms, run_in_background, %shell_id, "BashTool::run: called");

        let session = ctx.state.session(shell_id).await;
        let mut session = session.lock().await;

        if run_in_background {
            debug!("BashTool::run: launching background job");
            let job = background::launch(&mut session, &shell.program, &shell.background_dir, command, LAUNCH_TIMEOUT).await?;
            return Ok(json!({
                "output": format!("Background job started with ID: {}\nPID: {}", job.id, job.pid),
                "exit_code": 0,
                "shell_id": shell_id,
                "background_job_id": job.id,
                "pid": job.pid,
                "log_file": job.log_file,
            }));
        }

        let out = session.execute(command, Duration::from_millis(timeout_ms)).await?;
        drop(session);

        ctx.state.set_current_directory(&out.cwd).await;
        let output = truncate_output(out.output.trim_end_matches('\n'), ctx.config.limits.max_output_chars);

        Ok(json!({
            "output": output,
            "exit_code": out.exit_code,
            "shell_id": shell_id,
            "working_directory": out.cwd,
            "timed_out": out.timed_out,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ShellConfig};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_bash_basic() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = BashTool.execute(json!({"command": "echo hello"}), &ctx).await;

        assert!(result.success);
        assert_eq!(result.get_str("output"), "hello");
        assert_eq!(result.get("exit_code"), Some(&json!(0)));
        assert_eq!(result.get_str("shell_id"), "default");
        assert_eq!(result.get("timed_out"), Some(&json!(false)));
        ctx.state.shutdown().await;
    }

    #[tokio::test]
    async fn test_bash_nonzero_exit_is_success_envelope() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = BashTool.execute(json!({"command": "ls /definitely/not/here"}), &ctx).await;

        assert!(result.success);
        assert_ne!(result.get("exit_code"), Some(&json!(0)));
        assert!(result.get_str("output").contains("No such file"));
        ctx.state.shutdown().await;
    }

    #[tokio::test]
    async fn test_bash_cd_persists_and_updates_state() {
        let temp = tempdir().unwrap();
        let sub = temp.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        BashTool.execute(json!({"command": "cd sub"}), &ctx).await;
        let result = BashTool.execute(json!({"command": "pwd"}), &ctx).await;

        assert_eq!(result.get_str("output"), sub.to_str().unwrap());
        assert_eq!(ctx.state.current_directory().await, sub);
        ctx.state.shutdown().await;
    }

    #[tokio::test]
    async fn test_bash_sessions_are_independent() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        BashTool
            .execute(json!({"command": "export CA_SESSION_VAR=one", "shell_id": "a"}), &ctx)
            .await;
        let a = BashTool
            .execute(json!({"command": "echo \"[$CA_SESSION_VAR]\"", "shell_id": "a"}), &ctx)
            .await;
        let b = BashTool
            .execute(json!({"command": "echo \"[$CA_SESSION_VAR]\"", "shell_id": "b"}), &ctx)
            .await;

        assert_eq!(a.get_str("output"), "[one]");
        assert_eq!(b.get_str("output"), "[]");
        ctx.state.shutdown().await;
    }

    #[tokio::test]
    async fn test_bash_timeout() {
        let temp = tempdir().unwrap();
        let config = Config {
            shell: ShellConfig {
                kill_grace_ms: 200,
                ..Default::default()
            },
            ..Default::default()
        };
        let ctx = ToolContext::with_config(temp.path().to_path_buf(), config);

        let result = BashTool.execute(json!({"command": "sleep 30", "timeout": 300}), &ctx).await;

        assert!(result.success);
        assert_eq!(result.get("exit_code"), Some(&json!(-1)));
        assert_eq!(result.get("timed_out"), Some(&json!(true)));
        assert!(result.get_str("output").contains("timed out"));

        let result = BashTool.execute(json!({"command": "echo recovered"}), &ctx).await;
        assert_eq!(result.get_str("output"), "recovered");
        ctx.state.shutdown().await;
    }

    #[tokio::test]
    async fn test_bash_truncates_output() {
        let temp = tempdir().unwrap();
        let mut config = Config::default();
        config.limits.max_output_chars = 100;
        let ctx = ToolContext::with_config(temp.path().to_path_buf(), config);

        let result = BashTool
            .execute(json!({"command": "head -c 500 /dev/zero | tr '\\0' 'a'"}), &ctx)
            .await;

        let output = result.get_str("output");
        assert!(output.starts_with(&"a".repeat(100)));
        assert!(output.ends_with("... (output truncated, 500 total characters)"));
        ctx.state.shutdown().await;
    }

    #[tokio::test]
    async fn test_bash_missing_command() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = BashTool.execute(json!({}), &ctx).await;

        assert!(!result.success);
        assert_eq!(result.get_str("error_kind"), "validation");
    }

    #[tokio::test]
    async fn test_bash_background_job() {
        let temp = tempdir().unwrap();
        let config = Config {
            shell: ShellConfig {
                background_dir: temp.path().to_path_buf(),
                ..Default::default()
            },
            ..Default::default()
        };
        let ctx = ToolContext::with_config(temp.path().to_path_buf(), config);

        let result = BashTool
            .execute(json!({"command": "echo from-bg", "run_in_background": true}), &ctx)
            .await;

        assert!(result.success);
        let id = result.get_str("background_job_id").to_string();
        assert!(id.starts_with("bg_"));
        assert!(result.get_str("output").starts_with(&format!("Background job started with ID: {}\nPID: ", id)));
        assert!(temp.path().join(format!("{}.pid", id)).exists());
        ctx.state.shutdown().await;
    }
}
