//! Bridge from function tools to blocking tools
//!
//! Function tools take keyword arguments and may suspend. Blocking-tool
//! runtimes hand a tool one JSON string and expect a string back before the
//! call returns, with no error channel. [`wrap`] binds a function tool's
//! implementation once; [`BridgedTool::call`] then parses the arguments,
//! drives any pending result to completion and folds every failure into the
//! returned text.

use crate::error::{Error, Result, ToolError};
use crate::tools::function::{render_value, Invocation, ToolArgs, ToolFn};
use crate::tools::registry::panic_message;
use crate::tools::{Tool, ToolResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, error};

/// Tool contract of blocking-tool runtimes
pub trait BlockingTool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the object expected in `call`'s argument string
    fn parameters(&self) -> Value;

    /// Run the tool with a JSON-encoded argument object
    fn call(&self, params: &str) -> String;
}

/// The parts of a tool object the bridge knows how to bind to
///
/// Every accessor is optional; [`wrap`] probes them in priority order.
pub trait ToolShape {
    /// Human-readable kind of object, for diagnostics
    fn shape_name(&self) -> String;

    /// Self-reported tool name
    fn name(&self) -> Option<String> {
        None
    }

    /// Self-reported description
    fn description(&self) -> Option<String> {
        None
    }

    /// Parameter schema
    fn parameters(&self) -> Option<Value> {
        None
    }

    /// Dispatch wrapper through which the tool is normally invoked
    fn invoke(&self) -> Option<ToolFn> {
        None
    }

    /// Original implementation hidden behind the dispatch wrapper
    fn original(&self) -> Option<ToolFn> {
        None
    }

    /// Function stored directly on the object
    fn func(&self) -> Option<ToolFn> {
        None
    }

    /// The object itself, when it is callable
    fn callable(&self) -> Option<ToolFn> {
        None
    }
}

impl<T> ToolShape for Arc<T>
where
    T: Tool + ?Sized + 'static,
{
    fn shape_name(&self) -> String {
        format!("tool '{}'", Tool::name(self.as_ref()))
    }

    fn name(&self) -> Option<String> {
        let name = Tool::name(self.as_ref());
        (!name.is_empty()).then(|| name.to_string())
    }

    fn description(&self) -> Option<String> {
        let description = Tool::description(self.as_ref());
        (!description.is_empty()).then(|| description.to_string())
    }

    fn parameters(&self) -> Option<Value> {
        Some(self.parameters_schema())
    }

    fn invoke(&self) -> Option<ToolFn> {
        let tool = Arc::clone(self);
        let ident = format!("{}.execute", Tool::name(self.as_ref()));
        Some(ToolFn::asynchronous(ident, move |args| {
            let tool = Arc::clone(&tool);
            async move {
                let name = Tool::name(tool.as_ref()).to_string();
                let call = crate::tools::ToolCall::new(name.clone(), Value::Object(args));
                let result = tool.execute(call).await?;
                if result.success {
                    Ok(Value::String(result.content))
                } else {
                    Err(Error::from(ToolError::ExecutionFailed {
                        name,
                        message: ToolResult::failure_text(&result.content).to_string(),
                    }))
                }
            }
        }))
    }

    fn original(&self) -> Option<ToolFn> {
        self.implementation()
    }
}

/// An object carrying its function as a plain attribute
pub struct FuncTool {
    pub func: ToolFn,
}

impl ToolShape for FuncTool {
    fn shape_name(&self) -> String {
        format!("function holder '{}'", self.func.ident())
    }

    fn func(&self) -> Option<ToolFn> {
        Some(self.func.clone())
    }
}

impl ToolShape for ToolFn {
    fn shape_name(&self) -> String {
        format!("callable '{}'", self.ident())
    }

    fn callable(&self) -> Option<ToolFn> {
        Some(self.clone())
    }
}

/// A function tool re-exposed through the blocking-tool contract
#[derive(Debug, Clone)]
pub struct BridgedTool {
    name: String,
    description: String,
    parameters: Value,
    func: ToolFn,
}

/// Adapt a tool object to the blocking-tool contract.
///
/// Binds, in order of preference: the original implementation behind a
/// dispatch wrapper (or the wrapper itself when the original is hidden), a
/// `func` attribute, the object as a callable.
pub fn wrap(source: &dyn ToolShape) -> Result<BridgedTool> {
    let func = if let Some(invoke) = source.invoke() {
        match source.original() {
            Some(original) => original,
            None => {
                debug!(
                    shape = %source.shape_name(),
                    "Original implementation not exposed, binding to dispatch wrapper"
                );
                invoke
            }
        }
    } else if let Some(func) = source.func() {
        func
    } else if let Some(callable) = source.callable() {
        callable
    } else {
        return Err(ToolError::UnsupportedShape {
            shape: source.shape_name(),
        }
        .into());
    };

    let name = source.name().unwrap_or_else(|| func.ident().to_string());
    let description = source
        .description()
        .or_else(|| func.doc().filter(|d| !d.is_empty()).map(str::to_string))
        .unwrap_or_else(|| format!("Tool: {}", name));
    let parameters = source
        .parameters()
        .unwrap_or_else(|| serde_json::json!({"type": "object", "properties": {}}));

    debug!(tool = %name, bound = func.ident(), "Wrapped tool for blocking runtime");

    Ok(BridgedTool {
        name,
        description,
        parameters,
        func,
    })
}

impl BridgedTool {
    /// Identifier of the function this tool is bound to
    pub fn bound_ident(&self) -> &str {
        self.func.ident()
    }

    /// Same contract as [`BlockingTool::call`] for hosts that can await
    pub async fn call_async(&self, params: &str) -> String {
        let outcome = match self.start(params) {
            Ok(invocation) => {
                AssertUnwindSafe(invocation.resolve())
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| Err(self.panicked(payload.as_ref())))
            }
            Err(e) => Err(e),
        };
        self.finish(outcome)
    }

    fn call_blocking(&self, params: &str) -> Result<Value> {
        match self.start(params)? {
            Invocation::Ready(result) => result,
            Invocation::Pending(future) => self.block_on(future),
        }
    }

    /// Parse the arguments and call the bound function
    fn start(&self, params: &str) -> Result<Invocation> {
        let args = parse_arguments(params)?;
        debug!(tool = %self.name, ?args, "Calling bridged tool");
        panic::catch_unwind(AssertUnwindSafe(|| self.func.call(args)))
            .map_err(|payload| self.panicked(payload.as_ref()))
    }

    /// Drive a pending result to completion on the current thread
    fn block_on(&self, future: BoxFuture<'static, Result<Value>>) -> Result<Value> {
        let future = AssertUnwindSafe(future).catch_unwind();

        let outcome = match Handle::try_current() {
            Ok(handle) => match handle.runtime_flavor() {
                RuntimeFlavor::CurrentThread => {
                    return Err(ToolError::BlockingUnsupported {
                        name: self.name.clone(),
                    }
                    .into())
                }
                _ => tokio::task::block_in_place(|| handle.block_on(future)),
            },
            Err(_) => tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
                .block_on(future),
        };

        outcome.unwrap_or_else(|payload| Err(self.panicked(payload.as_ref())))
    }

    fn panicked(&self, payload: &(dyn std::any::Any + Send)) -> Error {
        ToolError::ExecutionFailed {
            name: self.name.clone(),
            message: format!("panicked: {}", panic_message(payload)),
        }
        .into()
    }

    fn finish(&self, outcome: Result<Value>) -> String {
        match outcome {
            Ok(value) => render_value(&value),
            Err(e) => {
                let message = format!("Tool {} execution failed: {}", self.name, e.reason());
                error!(tool = %self.name, "{}", message);
                message
            }
        }
    }
}

impl BlockingTool for BridgedTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        self.parameters.clone()
    }

    fn call(&self, params: &str) -> String {
        let outcome = self.call_blocking(params);
        self.finish(outcome)
    }
}

/// Parse a serialized argument object; blank input means no arguments
fn parse_arguments(params: &str) -> Result<ToolArgs> {
    if params.trim().is_empty() {
        return Ok(ToolArgs::new());
    }

    match serde_json::from_str::<Value>(params) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(ToolArgs::new()),
        Ok(other) => Err(ToolError::ArgumentParse {
            message: format!("expected a JSON object, got {}", other),
        }
        .into()),
        Err(e) => Err(ToolError::ArgumentParse {
            message: e.to_string(),
        }
        .into()),
    }
}
