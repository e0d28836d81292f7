//! ToolRegistry - dispatches tool calls by name

use serde_json::Value;
use tracing::debug;

use super::{CallMetadata, ToolCall, ToolContext, ToolDefinition, ToolError, ToolKind, ToolResult};

/// The set of tools offered to the agent
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolKind>,
}

impl ToolRegistry {
    /// Registry with every built-in tool
    pub fn standard() -> Self {
        Self {
            tools: ToolKind::ALL.to_vec(),
        }
    }

    /// Registry limited to `tools`
    pub fn with_tools(tools: &[ToolKind]) -> Self {
        let mut tools = tools.to_vec();
        tools.sort();
        tools.dedup();
        Self { tools }
    }

    /// Get tool definitions for LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|k| ToolDefinition::of(k.tool())).collect()
    }

    /// Get tool names
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|k| k.as_str()).collect()
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<ToolKind> {
        name.parse::<ToolKind>().ok().filter(|k| self.tools.contains(k))
    }

    /// Run one tool by name
    ///
    /// An unknown name still counts as a call and comes back as a failed envelope.
    pub async fn execute(&self, name: &str, input: Value, ctx: &ToolContext) -> ToolResult {
        match self.get(name) {
            Some(kind) => kind.tool().execute(input, ctx).await,
            None => {
                debug!(%name, "ToolRegistry::execute: unknown tool");
                let call_number = ctx.state.record_call(name).await;
                let err = ToolError::UnknownTool { name: name.to_string() };
                ToolResult::failure(&err, input, CallMetadata::now(name, call_number))
            }
        }
    }

    /// Execute a tool call
    pub async fn execute_call(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        self.execute(&call.name, call.input.clone(), ctx).await
    }

    /// Execute multiple tool calls in order
    pub async fn execute_all(&self, calls: &[ToolCall], ctx: &ToolContext) -> Vec<(Option<String>, ToolResult)> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let result = self.execute_call(call, ctx).await;
            results.push((call.id.clone(), result));
        }
        results
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
