//! Minimal configuration module for work-agent core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod types;

pub use types::{AgentBackend, LoadPolicy, ResolvedAgentConfig, ToolSettings, WeatherApiConfig};
