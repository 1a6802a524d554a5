//! CLI command implementations

pub mod agent;
pub mod call;
pub mod tools;

pub use agent::agent_command;
pub use call::call_command;
pub use tools::tools_command;

use anyhow::Result;
use tracing::info;
use work_agent_core::container::tool_context;
use work_agent_core::ToolRegistry;

use crate::config::CliConfigLoader;

/// Discover tools using only the tool settings of the loaded configuration
pub(crate) async fn discover_tools(loader: &CliConfigLoader) -> Result<ToolRegistry> {
    let settings = loader.load_tool_settings().await?;
    let ctx = tool_context(&settings)?;

    let mut registry = ToolRegistry::builtin(settings.load_policy);
    registry.discover_and_register(&ctx)?;
    info!(tools = registry.len(), "Tool discovery finished");
    Ok(registry)
}
