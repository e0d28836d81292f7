//! Todo items tracked in the session state

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::tools::ToolError;

/// Task status in the todo list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    /// Checkbox glyph used in the system hint
    pub fn glyph(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "[ ]",
            TodoStatus::InProgress => "[~]",
            TodoStatus::Completed => "[x]",
        }
    }
}

impl std::fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TodoStatus::Pending => write!(f, "pending"),
            TodoStatus::InProgress => write!(f, "in_progress"),
            TodoStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for TodoStatus {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TodoStatus::Pending),
            "in_progress" => Ok(TodoStatus::InProgress),
            "completed" => Ok(TodoStatus::Completed),
            other => Err(ToolError::InvalidArgument(format!("Invalid status: {}", other))),
        }
    }
}

/// A single todo item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    pub content: String,
    pub status: TodoStatus,
}

impl Todo {
    /// Validate one raw item from a TodoWrite call
    ///
    /// Numeric ids are accepted and kept as their decimal text.
    pub fn from_value(value: &Value) -> Result<Self, ToolError> {
        let missing = || ToolError::InvalidArgument("Each todo must have id, content, and status".into());

        let id = match value.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(missing()),
        };
        let content = value.get("content").and_then(Value::as_str).ok_or_else(missing)?;
        let status = value.get("status").and_then(Value::as_str).ok_or_else(missing)?;

        Ok(Self {
            id,
            content: content.to_string(),
            status: status.parse()?,
        })
    }

    /// Line rendered in the system hint
    pub fn hint_line(&self) -> String {
        format!("{} [{}] {} ({})", self.status.glyph(), self.id, self.content, self.status)
    }
}
