//! BashOutput tool - read the log of a background job

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Value, json};
use tracing::debug;

use crate::shell::{background, truncate_output};
use crate::tools::params::{optional_str, required_str};
use crate::tools::{Tool, ToolContext, ToolError};

/// Return everything a background job has written so far
pub struct BashOutputTool;

#[async_trait]
impl Tool for BashOutputTool {
    fn name(&self) -> &'static str {
        "BashOutput"
    }

    fn description(&self) -> &'static str {
        "Retrieve output from a background bash job started with run_in_background. Returns the \
         full output written so far on every call, optionally filtered to lines matching a regex."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "bash_id": {
                    "type": "string",
                    "description": "The background job id returned by Bash"
                },
                "filter": {
                    "type": "string",
                    "description": "Optional regex; only matching lines are returned"
                }
            },
            "required": ["bash_id"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let bash_id = required_str(input, "bash_id")?;
        background::validate_job_id(bash_id)?;
        let filter = optional_str(input, "filter")?
            .map(|f| Regex::new(f).map_err(|e| ToolError::InvalidRegex(e.to_string())))
            .transpose()?;
        debug!(%bash_id, has_filter = filter.is_some(), "BashOutputTool::run: called");

        let dir = &ctx.config.shell.background_dir;
        let log_file = background::log_path(dir, bash_id);
        let bytes = match tokio::fs::read(&log_file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolError::JobNotFound { id: bash_id.to_string() });
            }
            Err(e) => return Err(ToolError::io("Failed to read", &log_file, e)),
        };
        let content = String::from_utf8_lossy(&bytes);

        let output = match &filter {
            Some(re) => content.split('\n').filter(|line| re.is_match(line)).collect::<Vec<_>>().join("\n"),
            None => content.into_owned(),
        };
        let output_size = output.chars().count();

        let mut result = json!({
            "bash_id": bash_id,
            "output": truncate_output(&output, ctx.config.limits.max_output_chars),
            "output_size": output_size,
        });
        if let Some(running) = background::is_running(dir, bash_id).await {
            result["running"] = json!(running);
        }
        Ok(result)
    }
}
