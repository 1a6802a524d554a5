//! Function tools: plain callables invoked with keyword arguments
//!
//! A [`ToolFn`] takes its arguments as a JSON object and either answers right
//! away or hands back a pending future. [`FunctionTool`] decorates such a
//! function with a name, description and parameter schema, and routes every
//! call through a dispatch wrapper that keeps the undecorated function
//! reachable for adapters.

use crate::error::{Result, ToolError};
use crate::tools::{Tool, ToolCall, ToolResult};
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Keyword arguments of a tool call
pub type ToolArgs = serde_json::Map<String, Value>;

/// Outcome of calling a [`ToolFn`]
pub enum Invocation {
    /// The function finished synchronously
    Ready(Result<Value>),
    /// The function suspended; the future must be driven to completion
    Pending(BoxFuture<'static, Result<Value>>),
}

impl Invocation {
    /// Wrap a future as a pending invocation
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value>> + Send + 'static,
    {
        Invocation::Pending(Box::pin(future))
    }

    /// Whether the invocation still needs to be awaited
    pub fn is_pending(&self) -> bool {
        matches!(self, Invocation::Pending(_))
    }

    /// Await the invocation's value
    pub async fn resolve(self) -> Result<Value> {
        match self {
            Invocation::Ready(result) => result,
            Invocation::Pending(future) => future.await,
        }
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Invocation::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

type RawToolFn = dyn Fn(ToolArgs) -> Invocation + Send + Sync;

/// A shared, named callable taking keyword arguments
#[derive(Clone)]
pub struct ToolFn {
    ident: String,
    doc: Option<String>,
    inner: Arc<RawToolFn>,
}

impl ToolFn {
    /// Create a function from a closure returning an [`Invocation`]
    pub fn new<F>(ident: impl Into<String>, f: F) -> Self
    where
        F: Fn(ToolArgs) -> Invocation + Send + Sync + 'static,
    {
        Self {
            ident: ident.into(),
            doc: None,
            inner: Arc::new(f),
        }
    }

    /// Create a function that always answers synchronously
    pub fn sync<F>(ident: impl Into<String>, f: F) -> Self
    where
        F: Fn(ToolArgs) -> Result<Value> + Send + Sync + 'static,
    {
        Self::new(ident, move |args| Invocation::Ready(f(args)))
    }

    /// Create a function whose body is a future
    pub fn asynchronous<F, Fut>(ident: impl Into<String>, f: F) -> Self
    where
        F: Fn(ToolArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self::new(ident, move |args| Invocation::pending(f(args)))
    }

    /// Attach doc text, used as a fallback description
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// The function's own identifier
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// The function's doc text, if any
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Call the function
    pub fn call(&self, args: ToolArgs) -> Invocation {
        (self.inner)(args)
    }
}

impl fmt::Debug for ToolFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolFn").field("ident", &self.ident).finish()
    }
}

/// A callable published as a tool
///
/// Calls go through `on_invoke`, a dispatch wrapper around `implementation`.
pub struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
    on_invoke: ToolFn,
    implementation: Option<ToolFn>,
}

impl FunctionTool {
    /// Publish `implementation` as a tool
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        implementation: ToolFn,
    ) -> Self {
        let name = name.into();
        let on_invoke = Self::dispatcher(&name, implementation.clone());
        Self {
            name,
            description: description.into(),
            parameters,
            on_invoke,
            implementation: Some(implementation),
        }
    }

    /// Publish a tool that only exposes its dispatch entry point
    pub fn from_dispatch(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        on_invoke: ToolFn,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            on_invoke,
            implementation: None,
        }
    }

    fn dispatcher(name: &str, implementation: ToolFn) -> ToolFn {
        let tool_name = name.to_string();
        ToolFn::new(format!("{}.on_invoke", name), move |args| {
            debug!(tool = %tool_name, "Dispatching function tool call");
            implementation.call(args)
        })
    }

    /// The dispatch entry point
    pub fn on_invoke(&self) -> &ToolFn {
        &self.on_invoke
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.parameters.clone()
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let args = args_from_value(call.parameters)?;
        let value = self.on_invoke.call(args).resolve().await?;
        Ok(ToolResult::success(call.id, render_value(&value)))
    }

    fn implementation(&self) -> Option<ToolFn> {
        self.implementation.clone()
    }
}

/// Interpret a JSON value as keyword arguments; `null` means none
pub fn args_from_value(value: Value) -> Result<ToolArgs> {
    match value {
        Value::Null => Ok(ToolArgs::new()),
        Value::Object(map) => Ok(map),
        other => Err(ToolError::InvalidParameters {
            message: format!("expected a JSON object of arguments, got {}", other),
        }
        .into()),
    }
}

/// String form of a tool's return value; JSON strings are not re-quoted
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read a required string argument
pub fn required_str<'a>(args: &'a ToolArgs, key: &str) -> Result<&'a str> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ToolError::InvalidParameters {
            message: format!("Invalid parameter type for: {}", key),
        }
        .into()),
        None => Err(ToolError::InvalidParameters {
            message: format!("Missing parameter: {}", key),
        }
        .into()),
    }
}
