//! # work-agent CLI
//!
//! Command-line interface for work-agent.
//!
//! ## Usage
//!
//! - `work-agent tools` - Show discovered tools
//! - `work-agent call <tool> '{"arg": "value"}'` - Invoke one tool
//! - `work-agent call <tool> '{...}' --bridged` - Invoke it through the blocking-tool bridge
//! - `work-agent agent` - Assemble the configured agent and print its tool definitions

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{agent_command, call_command, tools_command};
use config::CliConfigLoader;

/// work-agent - tool discovery and bridging for interchangeable agent backends
#[derive(Parser)]
#[command(name = "work-agent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Discover tools and attach them to function-calling or blocking agent backends")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend to use (function_tools/openai, blocking_tools/qwen)
    #[arg(long, global = true)]
    backend: Option<String>,

    /// API key override
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Base URL override
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Model name override
    #[arg(long, global = true)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show available tools
    Tools {
        /// Print metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Call a tool with JSON-encoded arguments
    Call {
        /// Tool name
        tool: String,

        /// Arguments as a JSON object
        args: Option<String>,

        /// Call through the blocking-tool bridge
        #[arg(long)]
        bridged: bool,
    },

    /// Assemble the configured agent and show its tools
    Agent,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(backend) = &cli.backend {
        loader = loader.with_backend_override(backend.clone());
    }

    if let Some(api_key) = &cli.api_key {
        loader = loader.with_api_key_override(api_key.clone());
    }

    if let Some(base_url) = &cli.base_url {
        loader = loader.with_base_url_override(base_url.clone());
    }

    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    work_agent_core::init_tracing_with_debug(cli.verbose);

    let config_loader = build_config_loader(&cli);

    match cli.command {
        Commands::Tools { json } => tools_command(&config_loader, json).await,
        Commands::Call {
            tool,
            args,
            bridged,
        } => call_command(&config_loader, &tool, args, bridged).await,
        Commands::Agent => agent_command(&config_loader).await,
    }
}
