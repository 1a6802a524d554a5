//! Current time tool

use crate::error::{Result, ToolError};
use crate::impl_tool_source;
use crate::tools::{Tool, ToolCall, ToolResult};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::json;

/// Reports the current time; only UTC is supported
pub struct TimeNowTool;

impl TimeNowTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimeNowTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for TimeNowTool {
    fn name(&self) -> &str {
        "get_current_time"
    }

    fn description(&self) -> &str {
        "Get the current time as an ISO 8601 timestamp. Only the UTC timezone is supported."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "timezone_name": {
                    "type": "string",
                    "description": "Timezone name; only \"UTC\" is supported",
                    "default": "UTC"
                }
            }
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let timezone: String = call.get_parameter_or("timezone_name", "UTC".to_string());
        if !timezone.eq_ignore_ascii_case("UTC") {
            return Err(ToolError::InvalidParameters {
                message: format!("Unsupported timezone: {} (only UTC is supported)", timezone),
            }
            .into());
        }

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false);
        Ok(ToolResult::success(call.id, now))
    }
}

impl_tool_source!(TimeNowSource, TimeNowTool, "time_now");
