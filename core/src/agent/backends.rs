//! Backend-specific agents

use super::base::Agent;
use super::config::AgentConfig;
use crate::config::AgentBackend;
use crate::error::{Error, ToolError};
use crate::tools::{
    BlockingTool, BridgedTool, FunctionDefinition, Tool, ToolCall, ToolDefinition, ToolExecutor,
    ToolResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, error};

/// Agent for runtimes that call async keyword-argument tools
pub struct FunctionToolAgent {
    config: AgentConfig,
    executor: ToolExecutor,
}

impl FunctionToolAgent {
    pub fn new(config: AgentConfig, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            config,
            executor: ToolExecutor::with_tools(tools),
        }
    }
}

#[async_trait]
impl Agent for FunctionToolAgent {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn backend(&self) -> AgentBackend {
        AgentBackend::FunctionTools
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn instructions(&self) -> &str {
        &self.config.instructions
    }

    fn tool_names(&self) -> Vec<String> {
        self.executor
            .list_tools()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.executor.get_tool_definitions()
    }

    async fn call_tool(&self, name: &str, arguments: &str) -> String {
        let parameters = if arguments.trim().is_empty() {
            serde_json::Value::Object(Default::default())
        } else {
            match serde_json::from_str(arguments) {
                Ok(value) => value,
                Err(e) => {
                    let message = format!("Tool {} execution failed: Malformed tool arguments: {}", name, e);
                    error!(tool = name, "{}", message);
                    return message;
                }
            }
        };

        debug!(tool = name, "Calling function tool");
        let reason = match self.executor.execute(ToolCall::new(name, parameters)).await {
            Ok(result) if result.success => return result.content,
            Ok(result) => ToolResult::failure_text(&result.content).to_string(),
            Err(Error::Tool(ToolError::NotFound { .. })) => {
                return format!("Tool {} not found", name)
            }
            Err(e) => e.reason(),
        };

        let message = format!("Tool {} execution failed: {}", name, reason);
        error!(tool = name, "{}", message);
        message
    }
}

/// Agent for runtimes that call tools synchronously with a JSON string
pub struct BlockingToolAgent {
    config: AgentConfig,
    tools: HashMap<String, Arc<BridgedTool>>,
    order: Vec<String>,
}

impl BlockingToolAgent {
    pub fn new(config: AgentConfig, tools: Vec<BridgedTool>) -> Self {
        let mut map = HashMap::new();
        let mut order = Vec::new();
        for tool in tools {
            let name = BlockingTool::name(&tool).to_string();
            if map.insert(name.clone(), Arc::new(tool)).is_none() {
                order.push(name);
            }
        }
        Self {
            config,
            tools: map,
            order,
        }
    }

    /// A bridged tool by name
    pub fn tool(&self, name: &str) -> Option<&BridgedTool> {
        self.tools.get(name).map(|t| t.as_ref())
    }
}

#[async_trait]
impl Agent for BlockingToolAgent {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn backend(&self) -> AgentBackend {
        AgentBackend::BlockingTools
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn instructions(&self) -> &str {
        &self.config.instructions
    }

    fn tool_names(&self) -> Vec<String> {
        self.order.clone()
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| ToolDefinition {
                tool_type: "function".to_string(),
                function: FunctionDefinition {
                    name: BlockingTool::name(tool.as_ref()).to_string(),
                    description: BlockingTool::description(tool.as_ref()).to_string(),
                    parameters: BlockingTool::parameters(tool.as_ref()),
                },
            })
            .collect()
    }

    async fn call_tool(&self, name: &str, arguments: &str) -> String {
        let Some(tool) = self.tools.get(name) else {
            return format!("Tool {} not found", name);
        };

        // Without a multi-thread runtime there is no worker to spare for a blocked call
        let can_block = Handle::try_current()
            .map(|handle| handle.runtime_flavor() == RuntimeFlavor::MultiThread)
            .unwrap_or(false);
        if !can_block {
            return tool.call_async(arguments).await;
        }

        // The blocking runtime calls tools synchronously; keep that off the async workers.
        let tool = Arc::clone(tool);
        let arguments = arguments.to_string();
        match tokio::task::spawn_blocking(move || tool.call(&arguments)).await {
            Ok(output) => output,
            Err(e) => format!("Tool {} execution failed: {}", name, e),
        }
    }
}
