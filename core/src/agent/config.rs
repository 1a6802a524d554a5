//! Agent configuration and factory

use super::backends::{BlockingToolAgent, FunctionToolAgent};
use super::base::Agent;
use crate::config::{AgentBackend, ResolvedAgentConfig};
use crate::error::Result;
use crate::tools::{wrap, Tool};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Name given to agents that don't set one
pub const DEFAULT_AGENT_NAME: &str = "work-agent";

/// Instructions used when the configuration provides none
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful work assistant. \
Use the available tools when they help answer the user's request, \
and report tool errors to the user plainly.";

/// Configuration for an agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    /// Agent name
    pub name: String,

    /// Model identifier
    pub model: String,

    /// System instructions
    pub instructions: String,
}

impl AgentConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            name: DEFAULT_AGENT_NAME.to_string(),
            model: model.into(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }

    /// Set the system instructions
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }
}

impl From<&ResolvedAgentConfig> for AgentConfig {
    fn from(config: &ResolvedAgentConfig) -> Self {
        let agent = AgentConfig::new(config.model.clone());
        match &config.instructions {
            Some(instructions) => agent.with_instructions(instructions.clone()),
            None => agent,
        }
    }
}

/// Builds the agent matching a resolved configuration's backend
pub struct AgentFactory;

impl AgentFactory {
    /// Attach `tools` to a new agent for `config.backend`.
    ///
    /// Blocking backends get every tool wrapped through the bridge first; a
    /// tool the bridge can't bind fails the whole build.
    pub fn build(
        config: &ResolvedAgentConfig,
        tools: Vec<Arc<dyn Tool>>,
    ) -> Result<Box<dyn Agent>> {
        let agent_config = AgentConfig::from(config);

        let agent: Box<dyn Agent> = match config.backend {
            AgentBackend::FunctionTools => Box::new(FunctionToolAgent::new(agent_config, tools)),
            AgentBackend::BlockingTools => {
                let bridged = tools
                    .iter()
                    .map(|tool| wrap(tool))
                    .collect::<Result<Vec<_>>>()?;
                Box::new(BlockingToolAgent::new(agent_config, bridged))
            }
        };

        info!(
            backend = %config.backend,
            model = %config.model,
            tools = agent.tool_names().len(),
            "Agent assembled"
        );
        Ok(agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::{ShellEchoTool, TimeNowTool};

    fn resolved(backend: AgentBackend) -> ResolvedAgentConfig {
        ResolvedAgentConfig::new(
            backend,
            backend.default_base_url().to_string(),
            "sk-test".to_string(),
            backend.default_model().to_string(),
        )
    }

    fn tools() -> Vec<Arc<dyn Tool>> {
        vec![Arc::new(ShellEchoTool), Arc::new(TimeNowTool)]
    }

    #[test]
    fn test_agent_config_defaults() {
        let config = AgentConfig::new("gpt-4o");
        assert_eq!(config.name, DEFAULT_AGENT_NAME);
        assert_eq!(config.instructions, DEFAULT_INSTRUCTIONS);

        let custom = AgentConfig::from(
            &resolved(AgentBackend::FunctionTools).with_instructions("Be brief".to_string()),
        );
        assert_eq!(custom.instructions, "Be brief");
        assert_eq!(custom.model, "gpt-4o");
    }

    #[test]
    fn test_factory_picks_backend() {
        let native = AgentFactory::build(&resolved(AgentBackend::FunctionTools), tools()).unwrap();
        assert_eq!(native.backend(), AgentBackend::FunctionTools);
        assert_eq!(native.tool_names(), vec!["shell_echo", "get_current_time"]);

        let blocking = AgentFactory::build(&resolved(AgentBackend::BlockingTools), tools()).unwrap();
        assert_eq!(blocking.backend(), AgentBackend::BlockingTools);
        assert_eq!(blocking.model(), "qwen-plus");
        assert_eq!(blocking.tool_names(), native.tool_names());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_agent_runs_builtin_tools() {
        let agent = AgentFactory::build(&resolved(AgentBackend::BlockingTools), tools()).unwrap();

        let echoed = agent.call_tool("shell_echo", r#"{"text": "hi"}"#).await;
        assert_eq!(echoed, "[ECHO] hi");

        let rejected = agent.call_tool("shell_echo", r#"{"text": "a; rm"}"#).await;
        assert!(rejected.contains("dangerous characters"));
    }
}
