//! Tool system for the coding agent
//!
//! Every tool takes a JSON object, runs against a shared `ToolContext`
//! (working directory, shell sessions, todos, call counts) and returns a
//! `ToolResult` envelope. Failures never escape as errors: they come back as
//! envelopes with `success: false` plus a categorized `error_kind`.

mod context;
mod error;
mod kind;
mod registry;
mod traits;

pub mod builtin;
pub(crate) mod notebook;
pub(crate) mod params;
pub(crate) mod replace;

pub use context::ToolContext;
pub use error::{ErrorKind, ToolError};
pub use kind::ToolKind;
pub use registry::ToolRegistry;
pub use traits::{CallMetadata, TIMESTAMP_FORMAT, Tool, ToolCall, ToolDefinition, ToolResult};
