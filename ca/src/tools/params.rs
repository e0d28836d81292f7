//! Parameter extraction helpers for tool inputs

use serde_json::Value;

use super::ToolError;

/// Required string parameter
pub fn required_str<'a>(input: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    match input.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Null) | None => Err(ToolError::MissingParameter(key.to_string())),
        Some(_) => Err(ToolError::InvalidArgument(format!("{} must be a string", key))),
    }
}

/// Optional string parameter; null counts as absent
pub fn optional_str<'a>(input: &'a Value, key: &str) -> Result<Option<&'a str>, ToolError> {
    match input.get(key) {
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(ToolError::InvalidArgument(format!("{} must be a string", key))),
    }
}

/// Optional boolean parameter with a default
pub fn optional_bool(input: &Value, key: &str, default: bool) -> Result<bool, ToolError> {
    match input.get(key) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Null) | None => Ok(default),
        Some(_) => Err(ToolError::InvalidArgument(format!("{} must be a boolean", key))),
    }
}

/// Optional non-negative integer; numeric strings are accepted
pub fn optional_usize(input: &Value, key: &str) -> Result<Option<usize>, ToolError> {
    let invalid = || ToolError::InvalidArgument(format!("{} must be a non-negative integer", key));
    match input.get(key) {
        Some(Value::Number(n)) => n.as_u64().map(|n| Some(n as usize)).ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid()),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(invalid()),
    }
}

/// Required array parameter
pub fn required_array<'a>(input: &'a Value, key: &str) -> Result<&'a Vec<Value>, ToolError> {
    match input.get(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) | None => Err(ToolError::MissingParameter(key.to_string())),
        Some(_) => Err(ToolError::InvalidArgument(format!("{} must be an array", key))),
    }
}
