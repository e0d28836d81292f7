//! NotebookEdit tool - replace, insert or delete Jupyter notebook cells

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::tools::params::{optional_str, required_str};
use crate::tools::{Tool, ToolContext, ToolError, notebook};

/// Edit a single notebook cell by id
pub struct NotebookEditTool;

#[async_trait]
impl Tool for NotebookEditTool {
    fn name(&self) -> &'static str {
        "NotebookEdit"
    }

    fn description(&self) -> &'static str {
        "Edit a Jupyter notebook cell. edit_mode=replace (default) overwrites the source of the cell \
         with cell_id, insert adds a new cell after cell_id (or at the top when omitted), delete \
         removes the cell."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "notebook_path": {
                    "type": "string",
                    "description": "Path of the .ipynb file"
                },
                "cell_id": {
                    "type": "string",
                    "description": "Id of the cell to edit; for insert, the cell to insert after"
                },
                "new_source": {
                    "type": "string",
                    "description": "New source for the cell"
                },
                "cell_type": {
                    "type": "string",
                    "enum": ["code", "markdown"],
                    "description": "Cell type (default: code)"
                },
                "edit_mode": {
                    "type": "string",
                    "enum": ["replace", "insert", "delete"],
                    "description": "Kind of edit (default: replace)"
                }
            },
            "required": ["notebook_path"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let raw = required_str(input, "notebook_path")?;
        let cell_id = optional_str(input, "cell_id")?;
        let cell_type = optional_str(input, "cell_type")?.unwrap_or("code");
        let edit_mode = optional_str(input, "edit_mode")?.unwrap_or("replace");
        if !matches!(cell_type, "code" | "markdown") {
            return Err(ToolError::InvalidArgument(format!("Invalid cell_type: {}", cell_type)));
        }
        let new_source = match edit_mode {
            "replace" | "insert" => required_str(input, "new_source")?,
            "delete" => "",
            other => return Err(ToolError::InvalidArgument(format!("Invalid edit_mode: {}", other))),
        };
        if edit_mode != "insert" && cell_id.is_none() {
            return Err(ToolError::MissingParameter(format!("cell_id (required for {} mode)", edit_mode)));
        }
        debug!(%raw, ?cell_id, %edit_mode, "NotebookEditTool::run: called");

        let (path, _) = ctx.existing_file(raw).await?;
        let mut nb = notebook::load(&path).await?;
        let cells = nb
            .get_mut("cells")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| ToolError::InvalidNotebook("missing cells array".into()))?;

        let position = match cell_id {
            Some(id) => Some(
                cells
                    .iter()
                    .position(|cell| cell.get("id").and_then(Value::as_str) == Some(id))
                    .ok_or_else(|| ToolError::CellNotFound { id: id.to_string() })?,
            ),
            None => None,
        };

        let action = match (edit_mode, position) {
            ("insert", at) => {
                let index = at.map_or(0, |i| i + 1);
                cells.insert(index, new_cell(cell_type, new_source));
                "inserted"
            }
            ("delete", Some(i)) => {
                cells.remove(i);
                "deleted"
            }
            (_, Some(i)) => {
                let cell = &mut cells[i];
                cell["source"] = Value::Array(notebook::split_source(new_source));
                cell["cell_type"] = json!(cell_type);
                "replaced"
            }
            (mode, None) => return Err(ToolError::MissingParameter(format!("cell_id (required for {} mode)", mode))),
        };
        let total_cells = cells.len();

        notebook::save(&path, &nb).await?;

        Ok(json!({
            "notebook_path": path,
            "action": action,
            "total_cells": total_cells,
        }))
    }
}

fn new_cell(cell_type: &str, source: &str) -> Value {
    let mut cell = Map::new();
    cell.insert("cell_type".into(), json!(cell_type));
    cell.insert("metadata".into(), json!({}));
    cell.insert("source".into(), Value::Array(notebook::split_source(source)));
    if cell_type == "code" {
        cell.insert("outputs".into(), json!([]));
        cell.insert("execution_count".into(), Value::Null);
    }
    Value::Object(cell)
}
