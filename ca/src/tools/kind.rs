//! The closed set of tools the runtime knows about

use std::fmt;
use std::str::FromStr;

use super::builtin::{
    BashOutputTool, BashTool, EditFileTool, ExitPlanModeTool, GlobTool, GrepTool, KillBashTool, ListDirectoryTool,
    MultiEditTool, NotebookEditTool, ReadFileTool, TodoWriteTool, WriteFileTool,
};
use super::{Tool, ToolError};

/// Every tool the agent can call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolKind {
    Bash,
    BashOutput,
    KillBash,
    Read,
    Write,
    Edit,
    MultiEdit,
    NotebookEdit,
    Grep,
    Glob,
    Ls,
    TodoWrite,
    ExitPlanMode,
}

impl ToolKind {
    /// All tools, in the order they are presented to the LLM
    pub const ALL: [ToolKind; 13] = [
        ToolKind::Bash,
        ToolKind::BashOutput,
        ToolKind::KillBash,
        ToolKind::Read,
        ToolKind::Write,
        ToolKind::Edit,
        ToolKind::MultiEdit,
        ToolKind::NotebookEdit,
        ToolKind::Grep,
        ToolKind::Glob,
        ToolKind::Ls,
        ToolKind::TodoWrite,
        ToolKind::ExitPlanMode,
    ];

    /// Name the LLM uses to call this tool
    pub fn as_str(&self) -> &'static str {
        self.tool().name()
    }

    /// The implementation behind this tool
    pub fn tool(&self) -> &'static dyn Tool {
        match self {
            ToolKind::Bash => &BashTool,
            ToolKind::BashOutput => &BashOutputTool,
            ToolKind::KillBash => &KillBashTool,
            ToolKind::Read => &ReadFileTool,
            ToolKind::Write => &WriteFileTool,
            ToolKind::Edit => &EditFileTool,
            ToolKind::MultiEdit => &MultiEditTool,
            ToolKind::NotebookEdit => &NotebookEditTool,
            ToolKind::Grep => &GrepTool,
            ToolKind::Glob => &GlobTool,
            ToolKind::Ls => &ListDirectoryTool,
            ToolKind::TodoWrite => &TodoWriteTool,
            ToolKind::ExitPlanMode => &ExitPlanModeTool,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool { name: s.to_string() })
    }
}
