//! Agents: the backend-facing surface tools are attached to

pub mod backends;
pub mod base;
pub mod config;

pub use backends::{BlockingToolAgent, FunctionToolAgent};
pub use base::Agent;
pub use config::{AgentConfig, AgentFactory, DEFAULT_AGENT_NAME, DEFAULT_INSTRUCTIONS};
