//! ExitPlanMode tool - hand a finished plan back to the user

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::params::required_str;
use crate::tools::{Tool, ToolContext, ToolError};

pub struct ExitPlanModeTool;

#[async_trait]
impl Tool for ExitPlanModeTool {
    fn name(&self) -> &'static str {
        "ExitPlanMode"
    }

    fn description(&self) -> &'static str {
        "Present an implementation plan for approval once planning is done and before editing code."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "plan": {
                    "type": "string",
                    "description": "The plan, in markdown"
                }
            },
            "required": ["plan"]
        })
    }

    async fn run(&self, input: &Value, _ctx: &ToolContext) -> Result<Value, ToolError> {
        let plan = required_str(input, "plan")?;
        debug!(len = plan.len(), "ExitPlanModeTool::run: called");

        Ok(json!({
            "action": "exit_plan_mode",
            "plan": plan,
            "message": "Plan presented. Ready to implement.",
        }))
    }
}
