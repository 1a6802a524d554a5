//! Tool registry: discovery of the compiled-in tool sources
//!
//! Each [`ToolSource`] stands for one tool module. Discovery walks the
//! sources in manifest order, loads each one, and registers what it exposes
//! under a unique name. A broken source is skipped (or aborts discovery under
//! [`LoadPolicy::FailFast`]); a duplicate name always aborts discovery and
//! leaves the registry empty.

use crate::config::{LoadPolicy, ToolSettings};
use crate::error::{Error, Result, ToolError};
use crate::tools::{Tool, ToolCall, ToolFn, ToolResult};
use crate::weather::WeatherService;
use async_trait::async_trait;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Identifiers starting with this prefix are internal, never tool sources
pub const RESERVED_PREFIX: &str = "_";

/// Identifier of the module initializer, never a tool source
pub const INITIALIZER_NAME: &str = "mod";

/// Services handed to tool sources while they load
#[derive(Clone, Default)]
pub struct ToolContext {
    /// Tool settings from configuration
    pub settings: ToolSettings,
    /// Weather service, present when a weather API is configured
    pub weather: Option<Arc<WeatherService>>,
}

impl ToolContext {
    /// Create a context with the given settings and no services
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            settings,
            weather: None,
        }
    }

    /// Attach a weather service
    pub fn with_weather(mut self, weather: Arc<WeatherService>) -> Self {
        self.weather = Some(weather);
        self
    }
}

/// What a tool source exposes
pub enum ToolExport {
    Single(Arc<dyn Tool>),
    Many(Vec<Arc<dyn Tool>>),
}

impl ToolExport {
    fn into_tools(self) -> Vec<Arc<dyn Tool>> {
        match self {
            ToolExport::Single(tool) => vec![tool],
            ToolExport::Many(tools) => tools,
        }
    }
}

/// A module that may provide tools
pub trait ToolSource: Send + Sync {
    /// Identifier of the source, the fallback name for unnamed tools
    fn source_id(&self) -> &str;

    /// Load the source.
    ///
    /// `Ok(None)` means the source loaded but exposes no tool accessor.
    fn load(&self, ctx: &ToolContext) -> Result<Option<ToolExport>>;
}

/// Listing entry for a registered tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub source: String,
}

struct ToolRegistration {
    tool: Arc<dyn Tool>,
    source: String,
}

/// Registry of discovered tools, keyed by public name
pub struct ToolRegistry {
    sources: Vec<Box<dyn ToolSource>>,
    policy: LoadPolicy,
    tools: HashMap<String, ToolRegistration>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty registry over the given sources
    pub fn new(sources: Vec<Box<dyn ToolSource>>, policy: LoadPolicy) -> Self {
        Self {
            sources,
            policy,
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Create a registry over the built-in manifest
    pub fn builtin(policy: LoadPolicy) -> Self {
        Self::new(crate::tools::builtin::manifest(), policy)
    }

    /// Load every source and register the tools it exposes.
    ///
    /// Re-running discovery starts again from an empty map.
    pub fn discover_and_register(&mut self, ctx: &ToolContext) -> Result<Vec<Arc<dyn Tool>>> {
        self.clear();
        info!(sources = self.sources.len(), "Discovering tools");

        let outcome = self.discover(ctx);
        if let Err(e) = outcome {
            self.clear();
            return Err(e);
        }

        info!("Total tools loaded: {}", self.tools.len());
        Ok(self.tools())
    }

    fn discover(&mut self, ctx: &ToolContext) -> Result<()> {
        let sources = std::mem::take(&mut self.sources);
        let outcome = self.discover_from(&sources, ctx);
        self.sources = sources;
        outcome
    }

    fn discover_from(&mut self, sources: &[Box<dyn ToolSource>], ctx: &ToolContext) -> Result<()> {
        for source in sources {
            let source_id = source.source_id();

            if source_id.starts_with(RESERVED_PREFIX) || source_id == INITIALIZER_NAME {
                continue;
            }

            let export = match load_source(source.as_ref(), ctx) {
                Ok(Some(export)) => export,
                Ok(None) => {
                    warn!(
                        source = source_id,
                        "Tool source exposes no tool accessor, skipped"
                    );
                    continue;
                }
                Err(e) => {
                    error!(source = source_id, "Failed to load tool source: {}", e);
                    if self.policy == LoadPolicy::FailFast {
                        return Err(e);
                    }
                    continue;
                }
            };

            for tool in export.into_tools() {
                self.register(tool, source_id)?;
            }
        }
        Ok(())
    }

    fn register(&mut self, tool: Arc<dyn Tool>, source_id: &str) -> Result<()> {
        let tool = if tool.name().is_empty() {
            Arc::new(RenamedTool {
                name: source_id.to_string(),
                inner: tool,
            }) as Arc<dyn Tool>
        } else {
            tool
        };
        let name = tool.name().to_string();

        if let Some(existing) = self.tools.get(&name) {
            error!(
                tool = %name,
                source = source_id,
                existing_source = %existing.source,
                "Tool name conflict detected"
            );
            return Err(ToolError::NameConflict {
                name,
                source_id: source_id.to_string(),
                existing_source: existing.source.clone(),
            }
            .into());
        }

        info!("Loaded tool: {} (from {})", name, source_id);
        self.tools.insert(
            name.clone(),
            ToolRegistration {
                tool,
                source: source_id.to_string(),
            },
        );
        self.order.push(name);
        Ok(())
    }

    fn clear(&mut self) {
        self.tools.clear();
        self.order.clear();
    }

    /// Get a tool by name
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).map(|r| Arc::clone(&r.tool))
    }

    /// Registered tools in discovery order
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.order
            .iter()
            .filter_map(|name| self.lookup(name))
            .collect()
    }

    /// Name, description and source of every registered tool
    pub fn list_metadata(&self) -> Vec<ToolMetadata> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name).map(|r| (name, r)))
            .map(|(name, registration)| ToolMetadata {
                name: name.clone(),
                description: registration.tool.description().to_string(),
                source: registration.source.clone(),
            })
            .collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::builtin(LoadPolicy::default())
    }
}

/// Load a source, treating a panic as a load failure
fn load_source(source: &dyn ToolSource, ctx: &ToolContext) -> Result<Option<ToolExport>> {
    match panic::catch_unwind(AssertUnwindSafe(|| source.load(ctx))) {
        Ok(Ok(export)) => Ok(export),
        Ok(Err(e @ Error::Tool(ToolError::Load { .. }))) => Err(e),
        Ok(Err(e)) => Err(ToolError::Load {
            source_id: source.source_id().to_string(),
            message: e.to_string(),
        }
        .into()),
        Err(payload) => Err(ToolError::Load {
            source_id: source.source_id().to_string(),
            message: format!("panicked: {}", panic_message(payload.as_ref())),
        }
        .into()),
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// A tool re-exposed under its source's identifier
struct RenamedTool {
    name: String,
    inner: Arc<dyn Tool>,
}

#[async_trait]
impl Tool for RenamedTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn parameters_schema(&self) -> serde_json::Value {
        self.inner.parameters_schema()
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        self.inner.execute(call).await
    }

    fn implementation(&self) -> Option<ToolFn> {
        self.inner.implementation()
    }
}

/// Macro to help implement sources exposing a single tool built with `new()`
#[macro_export]
macro_rules! impl_tool_source {
    ($source:ident, $tool:ident, $id:expr) => {
        pub struct $source;

        impl $crate::tools::ToolSource for $source {
            fn source_id(&self) -> &str {
                $id
            }

            fn load(
                &self,
                _ctx: &$crate::tools::ToolContext,
            ) -> $crate::error::Result<Option<$crate::tools::ToolExport>> {
                Ok(Some($crate::tools::ToolExport::Single(
                    ::std::sync::Arc::new($tool::new()),
                )))
            }
        }
    };
}
