//! Agent assembly command

use anyhow::Result;
use work_agent_core::Container;

use crate::config::CliConfigLoader;

/// Build the full container and describe the assembled agent
pub async fn agent_command(loader: &CliConfigLoader) -> Result<()> {
    let config = loader.load().await?;
    let container = Container::build(config)?;
    let agent = container.agent();

    println!("🤖 Agent: {}", agent.name());
    println!("   Backend: {}", agent.backend());
    println!("   Model: {}", agent.model());
    println!("   Base URL: {}", container.config().base_url);
    println!("   Tools: {}\n", agent.tool_names().join(", "));
    println!("{}", serde_json::to_string_pretty(&agent.tool_definitions())?);

    container.shutdown();
    Ok(())
}
