//! LS tool - list entries of one directory

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::params::optional_str;
use crate::tools::{Tool, ToolContext, ToolError};

/// List files and directories in a path
pub struct ListDirectoryTool;

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &'static str {
        "LS"
    }

    fn description(&self) -> &'static str {
        "List the files and directories in a path (default: current directory). Hidden entries are \
         skipped; ignore takes glob patterns matched against entry names."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory to list"
                },
                "ignore": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Glob patterns of names to leave out"
                }
            }
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let ignore = match input.get("ignore") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    let raw = item
                        .as_str()
                        .ok_or_else(|| ToolError::InvalidArgument("ignore must be an array of strings".into()))?;
                    glob::Pattern::new(raw).map_err(|e| ToolError::InvalidGlob(e.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(ToolError::InvalidArgument("ignore must be an array of strings".into())),
        };

        let path = ctx.existing_dir(optional_str(input, "path")?).await?;
        debug!(path = %path.display(), ignore = ignore.len(), "ListDirectoryTool::run: called");

        let mut dir = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| ToolError::io("Failed to read directory", &path, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ToolError::io("Failed to read directory", &path, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || ignore.iter().any(|p| p.matches(&name)) {
                continue;
            }
            let Ok(metadata) = entry.metadata().await else {
                debug!(%name, "ListDirectoryTool::run: failed to get metadata, skipping entry");
                continue;
            };
            let kind = if metadata.is_dir() { "dir" } else { "file" };
            entries.push(json!({
                "name": name,
                "type": kind,
                "size": if metadata.is_dir() { 0 } else { metadata.len() },
                "path": entry.path(),
            }));
        }

        entries.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
        debug!(count = entries.len(), "ListDirectoryTool::run: entries collected");

        Ok(json!({
            "path": path,
            "total_entries": entries.len(),
            "entries": entries,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_list_directory_basic() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("b.txt"), "abc").unwrap();
        fs::write(temp.path().join("a.txt"), "").unwrap();
        fs::write(temp.path().join(".hidden"), "").unwrap();
        fs::create_dir(temp.path().join("subdir")).unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = ListDirectoryTool.execute(json!({}), &ctx).await;

        assert!(result.success);
        assert_eq!(result.get("total_entries"), Some(&json!(3)));
        let entries = result.get("entries").unwrap();
        assert_eq!(entries[0]["name"], "a.txt");
        assert_eq!(entries[1]["name"], "b.txt");
        assert_eq!(entries[1]["size"], 3);
        assert_eq!(entries[1]["path"], json!(temp.path().join("b.txt")));
        assert_eq!(entries[2]["type"], "dir");
    }

    #[tokio::test]
    async fn test_list_directory_ignore() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("keep.rs"), "").unwrap();
        fs::write(temp.path().join("drop.log"), "").unwrap();
        fs::create_dir(temp.path().join("target")).unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = ListDirectoryTool
            .execute(json!({"ignore": ["*.log", "target"]}), &ctx)
            .await;

        assert_eq!(result.get("total_entries"), Some(&json!(1)));
        assert_eq!(result.get("entries").unwrap()[0]["name"], "keep.rs");
    }

    #[tokio::test]
    async fn test_list_directory_with_path() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("subdir")).unwrap();
        fs::write(temp.path().join("subdir/nested.txt"), "").unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = ListDirectoryTool.execute(json!({"path": "subdir"}), &ctx).await;

        assert_eq!(result.get("path"), Some(&json!(temp.path().join("subdir"))));
        assert_eq!(result.get("entries").unwrap()[0]["name"], "nested.txt");
    }

    #[tokio::test]
    async fn test_list_directory_errors() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("file.txt"), "").unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let missing = ListDirectoryTool.execute(json!({"path": "nope"}), &ctx).await;
        assert_eq!(missing.get_str("error_type"), "PathNotFound");

        let not_dir = ListDirectoryTool.execute(json!({"path": "file.txt"}), &ctx).await;
        assert_eq!(not_dir.get_str("error_type"), "NotADirectory");
        assert_eq!(not_dir.get_str("error_kind"), "precondition");
    }
}
