//! Base agent trait

use crate::config::AgentBackend;
use crate::tools::ToolDefinition;
use async_trait::async_trait;

/// A backend agent with its tools attached
///
/// The reasoning loop belongs to the backend runtime; this is the surface it
/// needs from us: what the agent is, which tools it may call, and how a tool
/// call is answered.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name
    fn name(&self) -> &str;

    /// Backend this agent was built for
    fn backend(&self) -> AgentBackend;

    /// Model identifier
    fn model(&self) -> &str;

    /// System instructions
    fn instructions(&self) -> &str;

    /// Names of the attached tools
    fn tool_names(&self) -> Vec<String>;

    /// Function-calling definitions of the attached tools
    fn tool_definitions(&self) -> Vec<ToolDefinition>;

    /// Answer a tool call with JSON-encoded arguments.
    ///
    /// Never fails: errors come back as text the model can read.
    async fn call_tool(&self, name: &str, arguments: &str) -> String;
}
