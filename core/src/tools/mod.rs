//! Tool system: registry, function tools, blocking-tool bridge and built-in tools

pub mod base;
pub mod bridge;
pub mod builtin;
pub mod function;
pub mod registry;

pub use base::{FunctionDefinition, Tool, ToolCall, ToolDefinition, ToolExecutor, ToolResult};
pub use bridge::{wrap, BlockingTool, BridgedTool, FuncTool, ToolShape};
pub use function::{FunctionTool, Invocation, ToolArgs, ToolFn};
pub use registry::{ToolContext, ToolExport, ToolMetadata, ToolRegistry, ToolSource};
