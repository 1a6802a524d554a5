//! Echo tool: repeats text back, never runs it

use crate::error::Result;
use crate::impl_tool_source;
use crate::tools::{Tool, ToolCall, ToolResult};
use async_trait::async_trait;
use serde_json::json;

const DANGEROUS_CHARS: [char; 9] = [';', '&', '|', '`', '$', '(', ')', '<', '>'];

pub struct ShellEchoTool;

impl ShellEchoTool {
    pub fn new() -> Self {
        Self
    }

    fn echo(text: &str) -> String {
        if text.contains(DANGEROUS_CHARS) {
            return "Error: Input contains dangerous characters. Echo aborted.".to_string();
        }
        format!("[ECHO] {}", text)
    }
}

impl Default for ShellEchoTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ShellEchoTool {
    fn name(&self) -> &str {
        "shell_echo"
    }

    fn description(&self) -> &str {
        "Echo text back with an [ECHO] prefix. For demonstration only: nothing is executed, \
         and input containing shell metacharacters is refused."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "Text to echo"
                }
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let text: String = call.get_parameter("text")?;
        Ok(ToolResult::success(call.id, Self::echo(&text)))
    }
}

impl_tool_source!(ShellEchoSource, ShellEchoTool, "shell_echo");

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echoes_text() {
        let result = ShellEchoTool::new()
            .execute(ToolCall::new("shell_echo", json!({"text": "hello world"})))
            .await
            .unwrap();
        assert_eq!(result.content, "[ECHO] hello world");
    }

    #[test]
    fn test_refuses_metacharacters() {
        for text in ["ls; rm -rf /", "a && b", "$(whoami)", "cat < /etc/passwd"] {
            assert_eq!(
                ShellEchoTool::echo(text),
                "Error: Input contains dangerous characters. Echo aborted."
            );
        }
    }
}
