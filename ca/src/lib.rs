//! codeagent - tool-execution runtime for an autonomous coding agent
//!
//! The runtime turns tool calls (a name plus a JSON object) into JSON result
//! envelopes while keeping state between calls: the working directory,
//! persistent shell sessions, background jobs, the todo list and per-tool
//! call counts. The LLM loop that decides which tool to call lives elsewhere.
//!
//! # Modules
//!
//! - [`tools`] - Tool trait, result envelope, registry and built-in tools
//! - [`state`] - Session state shared by all tools, and the system hint
//! - [`shell`] - Persistent shell sessions and detached background jobs
//! - [`lint`] - Post-write syntax checks
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod lint;
pub mod shell;
pub mod state;
pub mod tools;

// Re-export commonly used types
pub use config::Config;
pub use state::{SystemState, Todo, TodoStatus};
pub use tools::{Tool, ToolCall, ToolContext, ToolDefinition, ToolError, ToolKind, ToolRegistry, ToolResult};
