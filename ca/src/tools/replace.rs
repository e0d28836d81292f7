//! Uniqueness-checked string replacement shared by Edit and MultiEdit

use std::path::Path;

use super::ToolError;

/// Characters of a missing `old_string` echoed back in the error
const PREVIEW_CHARS: usize = 100;

/// First 100 characters of `s`, with `...` when cut
pub fn preview(s: &str) -> String {
    if s.chars().count() <= PREVIEW_CHARS {
        return s.to_string();
    }
    let head: String = s.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", head)
}

/// Read a file that must be UTF-8 text
pub async fn read_text(path: &Path) -> Result<String, ToolError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ToolError::io("Failed to read", path, e))?;
    String::from_utf8(bytes).map_err(|_| ToolError::BinaryFile { path: path.to_path_buf() })
}

/// Replace `old` in `content`, returning the new text and the number of replacements
///
/// Fails when `old` is empty or absent, or when it occurs more than once and
/// `replace_all` is false.
pub fn replace_unique(content: &str, old: &str, new: &str, replace_all: bool) -> Result<(String, usize), ToolError> {
    if old.is_empty() {
        return Err(ToolError::InvalidArgument("old_string must not be empty".into()));
    }

    let count = content.matches(old).count();
    match count {
        0 => Err(ToolError::PatternNotFound { preview: preview(old) }),
        1 => Ok((content.replacen(old, new, 1), 1)),
        _ if replace_all => Ok((content.replace(old, new), count)),
        _ => Err(ToolError::PatternNotUnique { count }),
    }
}
