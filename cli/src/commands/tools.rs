//! Tools listing command

use anyhow::Result;
use tracing::info;

use super::discover_tools;
use crate::config::CliConfigLoader;

/// Show available tools
pub async fn tools_command(loader: &CliConfigLoader, json: bool) -> Result<()> {
    info!("Listing available tools");

    let registry = discover_tools(loader).await?;
    let metadata = registry.list_metadata();

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    if metadata.is_empty() {
        println!("No tools available.");
        return Ok(());
    }

    println!("🛠️  Available Tools\n");
    for tool in &metadata {
        println!("📦 {} (from {})", tool.name, tool.source);
        // Show first line of description only for brevity
        let first_line = tool.description.lines().next().unwrap_or_default();
        println!("   {}\n", first_line);
    }

    Ok(())
}
