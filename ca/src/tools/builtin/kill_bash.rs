//! KillBash tool - terminate a shell session or a background job

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::shell::background;
use crate::tools::params::required_str;
use crate::tools::{Tool, ToolContext, ToolError};

/// Kill a shell session by id, or a background job by its bash_id
pub struct KillBashTool;

#[async_trait]
impl Tool for KillBashTool {
    fn name(&self) -> &'static str {
        "KillBash"
    }

    fn description(&self) -> &'static str {
        "Kill a running shell session by its shell_id, or a background job by the id returned from \
         Bash with run_in_background. The process group gets SIGTERM, then SIGKILL after a grace period."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "shell_id": {
                    "type": "string",
                    "description": "Shell session id or background job id to kill"
                }
            },
            "required": ["shell_id"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let shell_id = required_str(input, "shell_id")?;
        debug!(%shell_id, "KillBashTool::run: called");

        if let Some(session) = ctx.state.remove_session(shell_id).await {
            session.lock().await.terminate().await;
            info!(%shell_id, "Shell session killed");
            return Ok(json!({ "shell_id": shell_id, "status": "terminated" }));
        }

        let grace = Duration::from_millis(ctx.config.shell.kill_grace_ms);
        if background::validate_job_id(shell_id).is_ok()
            && let Some((pid, was_running)) =
                background::terminate(&ctx.config.shell.background_dir, shell_id, grace).await
        {
            let status = if was_running { "terminated" } else { "not_running" };
            return Ok(json!({ "shell_id": shell_id, "status": status, "pid": pid }));
        }

        Err(ToolError::SessionNotFound { id: shell_id.to_string() })
    }
}
