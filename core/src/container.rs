//! Application container: wires services, tools and the agent together

use crate::agent::{Agent, AgentFactory};
use crate::config::{ResolvedAgentConfig, ToolSettings};
use crate::error::Result;
use crate::tools::{ToolContext, ToolRegistry};
use crate::weather::{WeatherApiClient, WeatherService};
use std::sync::Arc;
use tracing::{info, warn};

/// Owns everything a running agent needs
pub struct Container {
    config: ResolvedAgentConfig,
    registry: ToolRegistry,
    agent: Box<dyn Agent>,
}

impl Container {
    /// Build the container from a validated configuration.
    ///
    /// A tool name conflict aborts the build; sources that merely fail to
    /// load are handled according to the configured load policy.
    pub fn build(config: ResolvedAgentConfig) -> Result<Self> {
        let ctx = tool_context(&config.tools)?;

        let mut registry = ToolRegistry::builtin(config.tools.load_policy);
        let tools = registry.discover_and_register(&ctx)?;
        let agent = AgentFactory::build(&config, tools)?;

        info!(
            backend = %config.backend,
            tools = registry.len(),
            "Container initialized"
        );
        Ok(Self {
            config,
            registry,
            agent,
        })
    }

    pub fn config(&self) -> &ResolvedAgentConfig {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn agent(&self) -> &dyn Agent {
        self.agent.as_ref()
    }

    /// Release the agent and every registered tool
    pub fn shutdown(self) {
        info!(agent = self.agent.name(), "Shutting down container");
        drop(self.agent);
        drop(self.registry);
    }
}

/// Tool context for `settings`: the weather service is injected only when
/// an API key is configured.
pub fn tool_context(settings: &ToolSettings) -> Result<ToolContext> {
    let ctx = ToolContext::new(settings.clone());
    match &settings.weather {
        Some(weather) => {
            let api = WeatherApiClient::new(weather)?;
            Ok(ctx.with_weather(Arc::new(WeatherService::new(api))))
        }
        None => {
            warn!("Weather API key not configured; weather tool will be unavailable");
            Ok(ctx)
        }
    }
}
