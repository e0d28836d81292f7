//! Tool trait definition and the result envelope

use async_trait::async_trait;
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use super::context::ToolContext;
use super::error::ToolError;

/// Timestamp format used in call metadata and the system hint
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A tool that can be called by the LLM
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches LLM tool_use name)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Tool-specific work. Errors are turned into a failed envelope by `execute`.
    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError>;

    /// Count the call, run the tool and wrap whatever happened in a `ToolResult`
    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult {
        let name = self.name();
        let call_number = ctx.state.record_call(name).await;
        let metadata = CallMetadata::now(name, call_number);
        debug!(tool = name, call_number, "Tool::execute: called");

        match self.run(&input, ctx).await {
            Ok(Value::Object(data)) => ToolResult::success(data, metadata),
            Ok(other) => {
                let mut data = Map::new();
                data.insert("result".into(), other);
                ToolResult::success(data, metadata)
            }
            Err(err) => {
                debug!(tool = name, error = %err, "Tool::execute: tool failed");
                ToolResult::failure(&err, input, metadata)
            }
        }
    }
}

/// Per-call bookkeeping attached to every result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMetadata {
    pub tool: String,
    pub call_number: u64,
    pub timestamp: String,
}

impl CallMetadata {
    /// Metadata stamped with the current local time
    pub fn now(tool: &str, call_number: u64) -> Self {
        Self {
            tool: tool.to_string(),
            call_number,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Result of a tool execution
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub success: bool,
    pub data: Map<String, Value>,
    pub error: Option<String>,
    pub metadata: CallMetadata,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(data: Map<String, Value>, metadata: CallMetadata) -> Self {
        Self {
            success: true,
            data,
            error: None,
            metadata,
        }
    }

    /// Create a failed result from a tool error, echoing the input back
    pub fn failure(err: &ToolError, input: Value, metadata: CallMetadata) -> Self {
        let message = err.to_string();
        let mut data = err.details();
        data.insert("error".into(), json!(message));
        data.insert("error_type".into(), json!(err.type_name()));
        data.insert("error_kind".into(), json!(err.kind().to_string()));
        data.insert("tool".into(), json!(metadata.tool));
        data.insert("input".into(), input);

        Self {
            success: false,
            data,
            error: Some(message),
            metadata,
        }
    }

    /// Look up a payload field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Payload field as a string, empty when absent
    pub fn get_str(&self, key: &str) -> &str {
        self.data.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    /// Serialized form handed back to the LLM
    pub fn to_value(&self) -> Value {
        let mut map = self.data.clone();
        map.insert("success".into(), json!(self.success));
        if let Some(error) = &self.error {
            map.insert("error".into(), json!(error));
        }
        match serde_json::to_value(&self.metadata) {
            Ok(meta) => {
                map.insert("_metadata".into(), meta);
            }
            Err(e) => warn!(error = %e, "ToolResult::to_value: failed to serialize metadata"),
        }
        Value::Object(map)
    }
}

/// A tool call requested by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(alias = "tool")]
    pub name: String,
    #[serde(default = "empty_object")]
    pub input: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Tool description exposed to the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn of(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            input_schema: tool.input_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "Echo"
        }

        fn description(&self) -> &'static str {
            "Echo the `text` parameter"
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object", "properties": { "text": { "type": "string" } } })
        }

        async fn run(&self, input: &Value, _ctx: &ToolContext) -> Result<Value, ToolError> {
            match input.get("text").and_then(Value::as_str) {
                Some("scalar") => Ok(json!(42)),
                Some(text) => Ok(json!({ "text": text })),
                None => Err(ToolError::MissingParameter("text".into())),
            }
        }
    }

    #[tokio::test]
    async fn test_execute_wraps_success() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = EchoTool.execute(json!({"text": "hi"}), &ctx).await;

        assert!(result.success);
        assert_eq!(result.get_str("text"), "hi");
        assert_eq!(result.metadata.tool, "Echo");
        assert_eq!(result.metadata.call_number, 1);
        assert_eq!(result.metadata.timestamp.len(), 19);
    }

    #[tokio::test]
    async fn test_execute_wraps_scalar_output() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = EchoTool.execute(json!({"text": "scalar"}), &ctx).await;
        assert_eq!(result.get("result"), Some(&json!(42)));
    }

    #[tokio::test]
    async fn test_execute_wraps_failure() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let result = EchoTool.execute(json!({"other": 1}), &ctx).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Missing required parameter: text"));
        assert_eq!(result.get_str("error_type"), "MissingParameter");
        assert_eq!(result.get_str("error_kind"), "validation");
        assert_eq!(result.get_str("tool"), "Echo");
        assert_eq!(result.get("input"), Some(&json!({"other": 1})));
    }

    #[tokio::test]
    async fn test_call_numbers_count_failures_too() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let mut numbers = Vec::new();
        for input in [json!({"text": "a"}), json!({}), json!({"text": "b"}), json!({})] {
            numbers.push(EchoTool.execute(input, &ctx).await.metadata.call_number);
        }

        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(ctx.state.call_count("Echo").await, 4);
    }

    #[tokio::test]
    async fn test_to_value_merges_metadata() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf());

        let value = EchoTool.execute(json!({}), &ctx).await.to_value();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Missing required parameter: text");
        assert_eq!(value["_metadata"]["tool"], "Echo");
        assert_eq!(value["_metadata"]["call_number"], 1);
    }

    #[test]
    fn test_tool_call_accepts_tool_alias() {
        let call: ToolCall = serde_json::from_str(r#"{"tool": "LS"}"#).unwrap();
        assert_eq!(call.name, "LS");
        assert_eq!(call.input, json!({}));
        assert!(call.id.is_none());
    }
}
