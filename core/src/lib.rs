//! # work-agent Core
//!
//! Core library for work-agent: tool discovery, the bridge between tool
//! calling conventions, and agent assembly for interchangeable backends.
//!
//! Tools are discovered from a compiled-in manifest of sources into a
//! [`tools::ToolRegistry`]. Function-calling backends use them directly;
//! blocking backends get each tool wrapped with [`tools::wrap`] first.

// Core modules
pub mod agent;
pub mod config;
pub mod container;
pub mod error;
pub mod tools;
pub mod utils;
pub mod weather;

// Re-export commonly used types
pub use agent::{Agent, AgentConfig, AgentFactory};
pub use config::{AgentBackend, LoadPolicy, ResolvedAgentConfig, ToolSettings, WeatherApiConfig};
pub use container::Container;
pub use error::{Error, Result};
pub use tools::{wrap, BridgedTool, Tool, ToolRegistry};

/// Current version of the work-agent-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing on stderr, leaving stdout to command output.
///
/// `debug` forces the `debug` level; otherwise `LOG_LEVEL` is used, then `info`.
pub fn init_tracing_with_debug(debug: bool) {
    let filter = tracing_filter(debug, std::env::var("LOG_LEVEL").ok());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

fn tracing_filter(debug: bool, log_level: Option<String>) -> String {
    if debug {
        return "debug".to_string();
    }
    log_level
        .map(|level| level.trim().to_lowercase())
        .filter(|level| !level.is_empty())
        .unwrap_or_else(|| "info".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_filter() {
        assert_eq!(tracing_filter(true, Some("WARN".to_string())), "debug");
        assert_eq!(tracing_filter(false, Some("WARN".to_string())), "warn");
        assert_eq!(tracing_filter(false, Some("  ".to_string())), "info");
        assert_eq!(tracing_filter(false, None), "info");
    }
}
