//! TodoWrite tool - replace the session todo list

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::state::Todo;
use crate::tools::params::required_array;
use crate::tools::{Tool, ToolContext, ToolError};

/// Replace the whole todo list in one call
pub struct TodoWriteTool;

#[async_trait]
impl Tool for TodoWriteTool {
    fn name(&self) -> &'static str {
        "TodoWrite"
    }

    fn description(&self) -> &'static str {
        "Replace the task list for this session. Send every todo each time, each with id, content \
         and status (pending, in_progress or completed). Keep exactly one task in_progress while working."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "todos": {
                    "type": "array",
                    "description": "The complete, updated todo list",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "content": { "type": "string" },
                            "status": {
                                "type": "string",
                                "enum": ["pending", "in_progress", "completed"]
                            }
                        },
                        "required": ["id", "content", "status"]
                    }
                }
            },
            "required": ["todos"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let items = required_array(input, "todos")?;
        let todos = items.iter().map(Todo::from_value).collect::<Result<Vec<_>, _>>()?;
        debug!(count = todos.len(), "TodoWriteTool::run: called");

        let total = todos.len();
        ctx.state.replace_todos(todos).await;
        let (pending, in_progress, completed) = ctx.state.todo_counts().await;

        Ok(json!({
            "total_todos": total,
            "pending": pending,
            "in_progress": in_progress,
            "completed": completed,
        }))
    }
}
