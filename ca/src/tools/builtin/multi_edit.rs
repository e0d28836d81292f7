//! MultiEdit tool - atomic sequence of replacements on one file

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::params::{optional_bool, required_array, required_str};
use crate::tools::replace::{read_text, replace_unique};
use crate::tools::{Tool, ToolContext, ToolError};

/// One requested replacement
struct EditSpec<'a> {
    old_string: &'a str,
    new_string: &'a str,
    replace_all: bool,
}

impl<'a> EditSpec<'a> {
    fn parse(value: &'a Value) -> Result<Self, ToolError> {
        Ok(Self {
            old_string: required_str(value, "old_string")?,
            new_string: required_str(value, "new_string")?,
            replace_all: optional_bool(value, "replace_all", false)?,
        })
    }
}

/// Apply several edits to one file; either all land or the file is untouched
pub struct MultiEditTool;

#[async_trait]
impl Tool for MultiEditTool {
    fn name(&self) -> &'static str {
        "MultiEdit"
    }

    fn description(&self) -> &'static str {
        "Apply multiple find-and-replace edits to one file in order. Each edit sees the result of the \
         previous one. If any edit fails, nothing is written. To create a new file, make the first \
         edit's old_string empty and put the initial content in its new_string. An empty old_string \
         is rejected anywhere else, including on a file that already exists; use Write to replace a \
         whole file."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to modify"
                },
                "edits": {
                    "type": "array",
                    "minItems": 1,
                    "description": "Edits to apply in sequence",
                    "items": {
                        "type": "object",
                        "properties": {
                            "old_string": { "type": "string" },
                            "new_string": { "type": "string" },
                            "replace_all": { "type": "boolean" }
                        },
                        "required": ["old_string", "new_string"]
                    }
                }
            },
            "required": ["file_path", "edits"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let raw = required_str(input, "file_path")?;
        let items = required_array(input, "edits")?;
        if items.is_empty() {
            return Err(ToolError::InvalidArgument("edits must be a non-empty array".into()));
        }
        let total = items.len();
        let edits = items
            .iter()
            .enumerate()
            .map(|(i, item)| EditSpec::parse(item).map_err(|e| ToolError::edit_failed(i, total, e)))
            .collect::<Result<Vec<_>, _>>()?;

        let path = ctx.resolve_path(raw).await;
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| ToolError::io("Failed to stat", &path, e))?;
        let creating = !exists && edits[0].old_string.is_empty();
        debug!(path = %path.display(), total, creating, "MultiEditTool::run: called");

        let original = if exists {
            ctx.existing_file(raw).await?;
            read_text(&path).await?
        } else if creating {
            String::new()
        } else {
            return Err(ToolError::FileNotFound { path });
        };

        let mut buffer = original.clone();
        let mut edit_results = Vec::with_capacity(total);
        for (i, edit) in edits.iter().enumerate() {
            if i == 0 && creating {
                buffer = edit.new_string.to_string();
                edit_results.push(json!({ "edit": 1, "action": "created" }));
                continue;
            }
            let (next, replacements) = replace_unique(&buffer, edit.old_string, edit.new_string, edit.replace_all)
                .map_err(|e| ToolError::edit_failed(i, total, e))?;
            buffer = next;
            edit_results.push(json!({ "edit": i + 1, "replacements": replacements }));
        }

        if creating && let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::io("Failed to create directory", parent, e))?;
        }
        tokio::fs::write(&path, &buffer)
            .await
            .map_err(|e| ToolError::io("Failed to write", &path, e))?;

        let mut result = json!({
            "file_path": path,
            "total_edits": total,
            "successful_edits": edit_results.len(),
            "edit_results": edit_results,
            "old_size": original.chars().count(),
            "new_size": buffer.chars().count(),
            "created": creating,
        });
        if let Some(report) = ctx.verifiers.check(&path).await {
            result["lint_check"] = json!(report);
        }
        Ok(result)
    }
}
