//! Single tool invocation command

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::info;
use work_agent_core::tools::{BlockingTool, Tool, ToolCall};
use work_agent_core::wrap;

use super::discover_tools;
use crate::config::CliConfigLoader;

/// Call one registered tool and print its string result.
///
/// With `bridged`, the call takes the blocking-tool path: arguments stay a
/// JSON string and failures come back as text instead of an error.
pub async fn call_command(
    loader: &CliConfigLoader,
    tool_name: &str,
    arguments: Option<String>,
    bridged: bool,
) -> Result<()> {
    let registry = discover_tools(loader).await?;
    let tool = registry
        .lookup(tool_name)
        .ok_or_else(|| anyhow!("Tool {} not found", tool_name))?;
    let arguments = arguments.unwrap_or_default();

    info!(tool = tool_name, bridged, "Calling tool");

    if bridged {
        let bridged_tool = wrap(&tool)?;
        println!("{}", bridged_tool.call(&arguments));
        return Ok(());
    }

    let parameters: Value = if arguments.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(&arguments)
            .with_context(|| format!("Malformed tool arguments: {}", arguments))?
    };

    let result = tool.execute(ToolCall::new(tool_name, parameters)).await?;
    println!("{}", result.content);
    if !result.success {
        return Err(anyhow!("Tool {} execution failed", tool_name));
    }
    Ok(())
}
