//! Jupyter notebook helpers shared by Read and NotebookEdit

use std::path::Path;

use serde_json::{Value, json};

use super::ToolError;

/// Width of the rules separating notebook sections
const RULE_WIDTH: usize = 60;

/// Parse a notebook file, which must be a JSON object with a `cells` array
pub async fn load(path: &Path) -> Result<Value, ToolError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ToolError::io("Failed to read", path, e))?;
    let notebook: Value = serde_json::from_str(&content).map_err(|e| ToolError::InvalidNotebook(e.to_string()))?;
    if !notebook.get("cells").is_some_and(Value::is_array) {
        return Err(ToolError::InvalidNotebook("missing cells array".into()));
    }
    Ok(notebook)
}

/// Write a notebook back with 1-space indentation
pub async fn save(path: &Path, notebook: &Value) -> Result<(), ToolError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(notebook, &mut ser).map_err(|e| ToolError::InvalidNotebook(e.to_string()))?;
    buf.push(b'\n');
    tokio::fs::write(path, buf)
        .await
        .map_err(|e| ToolError::io("Failed to write", path, e))
}

/// Join a multiline field that may be a string or a list of strings
pub fn join_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts.iter().filter_map(Value::as_str).collect(),
        _ => String::new(),
    }
}

/// Split source text into lines that keep their trailing newline
pub fn split_source(text: &str) -> Vec<Value> {
    text.split_inclusive('\n').map(|line| json!(line)).collect()
}

/// Human-readable rendering of all cells and stored outputs
pub fn render(name: &str, notebook: &Value) -> (String, usize) {
    let cells = notebook.get("cells").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
    let mut lines = vec![format!("Jupyter Notebook: {}", name), "=".repeat(RULE_WIDTH)];

    for (i, cell) in cells.iter().enumerate() {
        let cell_type = cell.get("cell_type").and_then(Value::as_str).unwrap_or("unknown");
        lines.push(format!("\n[Cell {}] Type: {}", i + 1, cell_type));
        lines.push("-".repeat(RULE_WIDTH));
        lines.push(join_text(cell.get("source")));

        if cell_type != "code" {
            continue;
        }
        let outputs = cell.get("outputs").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
        if outputs.is_empty() {
            continue;
        }
        lines.push("\nOutput:".to_string());
        for output in outputs {
            match output.get("output_type").and_then(Value::as_str) {
                Some("stream") => lines.push(join_text(output.get("text"))),
                Some("execute_result" | "display_data") => {
                    if let Some(text) = output.get("data").and_then(|d| d.get("text/plain")) {
                        lines.push(join_text(Some(text)));
                    }
                }
                _ => {}
            }
        }
    }

    (lines.join("\n"), cells.len())
}
