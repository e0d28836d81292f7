//! Tool error types

use std::fmt;
use std::path::PathBuf;

use serde_json::{Map, Value, json};
use thiserror::Error;

/// Broad category of a tool failure, surfaced to the caller as `error_kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing parameters; nothing was touched
    Validation,
    /// The world is not in the state the call assumed (missing file, ambiguous match, ...)
    Precondition,
    /// The operation was attempted and failed (I/O, subprocess, decoding)
    Execution,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Precondition => write!(f, "precondition"),
            Self::Execution => write!(f, "execution"),
        }
    }
}

/// Errors that can occur during tool execution
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),

    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    #[error("Tool not found: {name}")]
    UnknownTool { name: String },

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Path not found: {}", path.display())]
    PathNotFound { path: PathBuf },

    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Not a file: {}", path.display())]
    NotAFile { path: PathBuf },

    #[error("String not found in file: {preview}")]
    PatternNotFound { preview: String },

    #[error("String appears {count} times in file. Use replace_all=true or provide more context to make it unique.")]
    PatternNotUnique { count: usize },

    #[error("Edit #{number} failed: {reason}")]
    EditFailed {
        /// 0-based index of the failing edit
        index: usize,
        /// 1-based position, as shown to the caller
        number: usize,
        total: usize,
        reason: Box<ToolError>,
    },

    #[error("Shell session not found: {id}")]
    SessionNotFound { id: String },

    #[error("No output found for bash_id: {id}")]
    JobNotFound { id: String },

    #[error("Cell with ID {id} not found")]
    CellNotFound { id: String },

    #[error("File appears to be binary. Cannot read as text: {}", path.display())]
    BinaryFile { path: PathBuf },

    #[error("Invalid Jupyter notebook format: {0}")]
    InvalidNotebook(String),

    #[error("Shell error: {0}")]
    Shell(String),

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    /// Wrap an I/O failure with the action and path that caused it
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Failure of one edit inside a batch
    pub fn edit_failed(index: usize, total: usize, reason: ToolError) -> Self {
        Self::EditFailed {
            index,
            number: index + 1,
            total,
            reason: Box::new(reason),
        }
    }

    /// Category used by callers to decide whether a retry with different input makes sense
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingParameter(_) | Self::InvalidArgument(_) | Self::InvalidRegex(_) | Self::InvalidGlob(_) => {
                ErrorKind::Validation
            }
            Self::UnknownTool { .. }
            | Self::FileNotFound { .. }
            | Self::PathNotFound { .. }
            | Self::NotADirectory { .. }
            | Self::NotAFile { .. }
            | Self::PatternNotFound { .. }
            | Self::PatternNotUnique { .. }
            | Self::SessionNotFound { .. }
            | Self::JobNotFound { .. }
            | Self::CellNotFound { .. } => ErrorKind::Precondition,
            Self::EditFailed { reason, .. } => reason.kind(),
            Self::BinaryFile { .. } | Self::InvalidNotebook(_) | Self::Shell(_) | Self::Io { .. } => {
                ErrorKind::Execution
            }
        }
    }

    /// Variant name, reported as `error_type`
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::MissingParameter(_) => "MissingParameter",
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::InvalidRegex(_) => "InvalidRegex",
            Self::InvalidGlob(_) => "InvalidGlob",
            Self::UnknownTool { .. } => "UnknownTool",
            Self::FileNotFound { .. } => "FileNotFound",
            Self::PathNotFound { .. } => "PathNotFound",
            Self::NotADirectory { .. } => "NotADirectory",
            Self::NotAFile { .. } => "NotAFile",
            Self::PatternNotFound { .. } => "PatternNotFound",
            Self::PatternNotUnique { .. } => "PatternNotUnique",
            Self::EditFailed { .. } => "EditFailed",
            Self::SessionNotFound { .. } => "SessionNotFound",
            Self::JobNotFound { .. } => "JobNotFound",
            Self::CellNotFound { .. } => "CellNotFound",
            Self::BinaryFile { .. } => "BinaryFile",
            Self::InvalidNotebook(_) => "InvalidNotebook",
            Self::Shell(_) => "Shell",
            Self::Io { .. } => "Io",
        }
    }

    /// Structured context merged into a failed result so the caller can self-correct
    pub fn details(&self) -> Map<String, Value> {
        let value = match self {
            Self::FileNotFound { path }
            | Self::PathNotFound { path }
            | Self::NotADirectory { path }
            | Self::NotAFile { path }
            | Self::BinaryFile { path }
            | Self::Io { path, .. } => json!({ "path": path }),
            Self::PatternNotFound { preview } => json!({ "old_string": preview }),
            Self::PatternNotUnique { count } => json!({ "count": count }),
            Self::EditFailed {
                index, total, reason, ..
            } => {
                let mut map = reason.details();
                map.insert("failed_edit".into(), json!(index));
                map.insert("completed_edits".into(), json!(index));
                map.insert("total_edits".into(), json!(total));
                map.insert("reason".into(), json!(reason.to_string()));
                return map;
            }
            Self::SessionNotFound { id } => json!({ "shell_id": id }),
            Self::JobNotFound { id } => json!({ "bash_id": id }),
            Self::CellNotFound { id } => json!({ "cell_id": id }),
            _ => return Map::new(),
        };

        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}
