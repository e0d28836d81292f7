//! Glob tool - find files matching a pattern, newest first

use std::path::PathBuf;
use std::time::SystemTime;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::params::{optional_str, required_str};
use crate::tools::{Tool, ToolContext, ToolError};

/// Find files matching a glob pattern
pub struct GlobTool;

/// Patterns always search recursively
fn recursive_pattern(pattern: &str) -> String {
    if pattern.starts_with("**/") {
        pattern.to_string()
    } else {
        format!("**/{}", pattern.trim_start_matches("./"))
    }
}

#[async_trait]
impl Tool for GlobTool {
    fn name(&self) -> &'static str {
        "Glob"
    }

    fn description(&self) -> &'static str {
        "Find files by glob pattern (e.g. '*.py' or 'src/**/*.rs'), searched recursively. \
         Returns absolute paths sorted by modification time, newest first."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Glob pattern to match"
                },
                "path": {
                    "type": "string",
                    "description": "Directory to search in (default: current directory)"
                }
            },
            "required": ["pattern"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let pattern = required_str(input, "pattern")?;
        let full = recursive_pattern(pattern);
        glob::Pattern::new(&full).map_err(|e| ToolError::InvalidGlob(e.to_string()))?;

        let base = ctx.existing_dir(optional_str(input, "path")?).await?;
        debug!(%pattern, base = %base.display(), "GlobTool::run: called");

        let query = format!("{}/{}", glob::Pattern::escape(&base.to_string_lossy()), full);
        let paths = glob::glob(&query).map_err(|e| ToolError::InvalidGlob(e.to_string()))?;

        let mut matches: Vec<(PathBuf, SystemTime)> = paths
            .filter_map(|r| r.ok())
            .filter_map(|p| {
                let meta = std::fs::metadata(&p).ok();
                match meta {
                    Some(m) if !m.is_file() => None,
                    Some(m) => Some((p, m.modified().unwrap_or(SystemTime::UNIX_EPOCH))),
                    None => Some((p, SystemTime::UNIX_EPOCH)),
                }
            })
            .collect();
        matches.sort_by(|a, b| b.1.cmp(&a.1));
        debug!(count = matches.len(), "GlobTool::run: matches found");

        let files: Vec<String> = matches.into_iter().map(|(p, _)| p.display().to_string()).collect();
        Ok(json!({
            "pattern": pattern,
            "search_path": base,
            "total_matches": files.len(),
            "matches": files,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::tempdir;

    fn names(result: &crate::tools::ToolResult) -> BTreeSet<String> {
        result
            .get("matches")
            .and_then(Value::as_array)
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_recursive_pattern() {
        assert_eq!(recursive_pattern("*.py"), "**/*.py");
        assert_eq!(recursive_pattern("**/*.py"), "**/*.py");
        assert_eq!(recursive_pattern("./src/*.rs"), "**/src/*.rs");
    }

    #[tokio::test]
    async fn test_glob_recursive_by_default() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("pkg")).unwrap();
        fs::write(temp.path().join("main.py"), "").unwrap();
        fs::write(temp.path().join("pkg/util.py"), "").unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let short = GlobTool.execute(json!({"pattern": "*.py"}), &ctx).await;
        let long = GlobTool.execute(json!({"pattern": "**/*.py"}), &ctx).await;

        assert!(short.success);
        assert_eq!(short.get("total_matches"), Some(&json!(2)));
        assert_eq!(names(&short), names(&long));
        assert!(names(&short).contains(&temp.path().join("pkg/util.py").display().to_string()));
    }

    #[tokio::test]
    async fn test_glob_newest_first() {
        let temp = tempdir().unwrap();
        let old = temp.path().join("old.rs");
        let new = temp.path().join("new.rs");
        fs::write(&old, "").unwrap();
        fs::write(&new, "").unwrap();
        let past = SystemTime::now() - std::time::Duration::from_secs(3600);
        fs::File::options().write(true).open(&old).unwrap().set_modified(past).unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = GlobTool.execute(json!({"pattern": "*.rs"}), &ctx).await;

        let matches = result.get("matches").unwrap();
        assert_eq!(matches[0], json!(new.display().to_string()));
        assert_eq!(matches[1], json!(old.display().to_string()));
    }

    #[tokio::test]
    async fn test_glob_excludes_directories() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("dir.py")).unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = GlobTool.execute(json!({"pattern": "*.py"}), &ctx).await;

        assert_eq!(result.get("total_matches"), Some(&json!(0)));
    }

    #[tokio::test]
    async fn test_glob_with_path() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/lib.rs"), "").unwrap();
        fs::write(temp.path().join("main.rs"), "").unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = GlobTool.execute(json!({"pattern": "*.rs", "path": "src"}), &ctx).await;

        assert_eq!(result.get("total_matches"), Some(&json!(1)));
        assert_eq!(result.get("search_path"), Some(&json!(temp.path().join("src"))));
    }

    #[tokio::test]
    async fn test_glob_errors() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let bad = GlobTool.execute(json!({"pattern": "[abc"}), &ctx).await;
        assert_eq!(bad.get_str("error_type"), "InvalidGlob");

        let missing = GlobTool.execute(json!({"pattern": "*.rs", "path": "nope"}), &ctx).await;
        assert_eq!(missing.get_str("error_kind"), "precondition");

        let no_pattern = GlobTool.execute(json!({}), &ctx).await;
        assert_eq!(no_pattern.get_str("error_type"), "MissingParameter");
    }
}
