//! Write tool - create or overwrite a file

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::params::required_str;
use crate::tools::{Tool, ToolContext, ToolError};

/// Write content to a file, creating parent directories
pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &'static str {
        "Write"
    }

    fn description(&self) -> &'static str {
        "Write content to a file, creating parent directories as needed and overwriting any existing \
         file. Python and JavaScript files are syntax-checked after writing."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to write"
                },
                "content": {
                    "type": "string",
                    "description": "Content to write"
                }
            },
            "required": ["file_path", "content"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let raw = required_str(input, "file_path")?;
        let content = required_str(input, "content")?;
        let path = ctx.resolve_path(raw).await;
        debug!(path = %path.display(), bytes = content.len(), "WriteFileTool::run: called");

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::io("Failed to create directory", parent, e))?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| ToolError::io("Failed to write", &path, e))?;

        let mut result = json!({
            "file_path": path,
            "bytes_written": content.len(),
            "lines_written": content.split('\n').count(),
        });
        if let Some(report) = ctx.verifiers.check(&path).await {
            result["lint_check"] = json!(report);
        }
        Ok(result)
    }
}
