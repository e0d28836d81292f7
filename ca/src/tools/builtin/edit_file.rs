//! Edit tool - replace a unique string in a file

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::params::{optional_bool, required_str};
use crate::tools::replace::{read_text, replace_unique};
use crate::tools::{Tool, ToolContext, ToolError};

/// Replace a specific string in a file
pub struct EditFileTool;

#[async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &'static str {
        "Edit"
    }

    fn description(&self) -> &'static str {
        "Replace an exact string in a file. Fails if old_string is missing, or if it appears more than \
         once and replace_all is not set; include surrounding context to make it unique. Preserve \
         indentation exactly."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to modify"
                },
                "old_string": {
                    "type": "string",
                    "description": "Exact string to find and replace"
                },
                "new_string": {
                    "type": "string",
                    "description": "Replacement string"
                },
                "replace_all": {
                    "type": "boolean",
                    "description": "Replace all occurrences (default: false)"
                }
            },
            "required": ["file_path", "old_string", "new_string"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let raw = required_str(input, "file_path")?;
        let old_string = required_str(input, "old_string")?;
        let new_string = required_str(input, "new_string")?;
        let replace_all = optional_bool(input, "replace_all", false)?;
        if old_string.is_empty() {
            return Err(ToolError::InvalidArgument("old_string must not be empty".into()));
        }
        debug!(%raw, replace_all, "EditFileTool::run: called");

        let (path, _) = ctx.existing_file(raw).await?;
        let content = read_text(&path).await?;
        let (updated, replacements) = replace_unique(&content, old_string, new_string, replace_all)?;
        debug!(replacements, "EditFileTool::run: replaced");

        tokio::fs::write(&path, &updated)
            .await
            .map_err(|e| ToolError::io("Failed to write", &path, e))?;

        let mut result = json!({
            "file_path": path,
            "replacements": replacements,
            "old_length": content.chars().count(),
            "new_length": updated.chars().count(),
        });
        if let Some(report) = ctx.verifiers.check(&path).await {
            result["lint_check"] = json!(report);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_edit_single() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("test.txt"), "Hello, world!").unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = EditFileTool
            .execute(
                json!({"file_path": "test.txt", "old_string": "world", "new_string": "Rust"}),
                &ctx,
            )
            .await;

        assert!(result.success);
        assert_eq!(result.get("replacements"), Some(&json!(1)));
        assert_eq!(result.get("old_length"), Some(&json!(13)));
        assert_eq!(result.get("new_length"), Some(&json!(12)));
        assert_eq!(std::fs::read_to_string(temp.path().join("test.txt")).unwrap(), "Hello, Rust!");
    }

    #[tokio::test]
    async fn test_edit_ambiguous_then_replace_all() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("dup.txt");
        std::fs::write(&file, "foo bar foo baz foo").unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = EditFileTool
            .execute(json!({"file_path": "dup.txt", "old_string": "foo", "new_string": "qux"}), &ctx)
            .await;

        assert!(!result.success);
        let error = result.error.clone().unwrap();
        assert!(error.contains('3'));
        assert!(error.contains("replace_all"));
        assert_eq!(result.get("count"), Some(&json!(3)));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "foo bar foo baz foo");

        let result = EditFileTool
            .execute(
                json!({"file_path": "dup.txt", "old_string": "foo", "new_string": "qux", "replace_all": true}),
                &ctx,
            )
            .await;

        assert!(result.success);
        assert_eq!(result.get("replacements"), Some(&json!(3)));
        assert!(!std::fs::read_to_string(&file).unwrap().contains("foo"));
    }

    #[tokio::test]
    async fn test_edit_not_found() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("test.txt"), "Hello, world!").unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = EditFileTool
            .execute(json!({"file_path": "test.txt", "old_string": "absent", "new_string": "x"}), &ctx)
            .await;

        assert!(!result.success);
        assert_eq!(result.get_str("error_type"), "PatternNotFound");
        assert_eq!(result.get_str("old_string"), "absent");
    }

    #[tokio::test]
    async fn test_edit_missing_file() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = EditFileTool
            .execute(json!({"file_path": "nope.txt", "old_string": "a", "new_string": "b"}), &ctx)
            .await;

        assert_eq!(result.get_str("error_type"), "FileNotFound");
        assert_eq!(result.get_str("error_kind"), "precondition");
    }

    #[tokio::test]
    async fn test_edit_empty_old_string() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("test.txt"), "abc").unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = EditFileTool
            .execute(json!({"file_path": "test.txt", "old_string": "", "new_string": "x"}), &ctx)
            .await;

        assert_eq!(result.get_str("error_kind"), "validation");
        assert_eq!(std::fs::read_to_string(temp.path().join("test.txt")).unwrap(), "abc");
    }
}
