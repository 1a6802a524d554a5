//! Resolved configuration types for work-agent core
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in the CLI layer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Agent backend, distinguished by the tool calling convention it expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentBackend {
    /// OpenAI-compatible runtime: tools are async keyword-argument functions
    #[serde(rename = "function_tools", alias = "openai")]
    FunctionTools,
    /// DashScope / Qwen runtime: tools take one JSON string and return synchronously
    #[serde(rename = "blocking_tools", alias = "qwen", alias = "dashscope")]
    BlockingTools,
}

impl AgentBackend {
    /// Get the backend name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentBackend::FunctionTools => "function_tools",
            AgentBackend::BlockingTools => "blocking_tools",
        }
    }

    /// Parse a backend name, accepting provider aliases
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "function_tools" | "openai" => Some(AgentBackend::FunctionTools),
            "blocking_tools" | "qwen" | "dashscope" => Some(AgentBackend::BlockingTools),
            _ => None,
        }
    }

    /// Get the default base URL for this backend
    pub fn default_base_url(&self) -> &'static str {
        match self {
            AgentBackend::FunctionTools => "https://api.openai.com/v1",
            AgentBackend::BlockingTools => "https://dashscope.aliyuncs.com/compatible-mode/v1",
        }
    }

    /// Get the default model for this backend
    pub fn default_model(&self) -> &'static str {
        match self {
            AgentBackend::FunctionTools => "gpt-4o",
            AgentBackend::BlockingTools => "qwen-plus",
        }
    }
}

impl std::fmt::Display for AgentBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What discovery does when a tool source fails to load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Log the broken source and keep discovering
    #[default]
    SkipBroken,
    /// Abort discovery on the first broken source
    FailFast,
}

impl LoadPolicy {
    /// Parse a policy name
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "skip_broken" | "skip" => Some(LoadPolicy::SkipBroken),
            "fail_fast" | "fail" => Some(LoadPolicy::FailFast),
            _ => None,
        }
    }
}

/// Weather API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherApiConfig {
    /// Base URL of the OpenWeatherMap-compatible API
    pub base_url: String,
    /// API key sent as the `appid` query parameter
    pub api_key: String,
    /// Request timeout in seconds
    #[serde(default = "WeatherApiConfig::default_timeout_secs")]
    pub timeout_secs: f64,
    /// Retries on connection errors, timeouts and 5xx responses
    #[serde(default = "WeatherApiConfig::default_retry_count")]
    pub retry_count: u32,
}

impl WeatherApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openweathermap.org/data/2.5";

    /// Create a weather config with default timeout and retries
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            timeout_secs: Self::default_timeout_secs(),
            retry_count: Self::default_retry_count(),
        }
    }

    fn default_timeout_secs() -> f64 {
        30.0
    }

    fn default_retry_count() -> u32 {
        2
    }

    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs.max(0.0))
    }
}

/// Settings consumed while discovering and building tools
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Behavior on a broken tool source
    #[serde(default)]
    pub load_policy: LoadPolicy,
    /// Weather API settings; the weather tool is unavailable without them
    #[serde(default)]
    pub weather: Option<WeatherApiConfig>,
}

/// A fully resolved agent configuration ready for use by core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedAgentConfig {
    /// Backend to assemble
    pub backend: AgentBackend,
    /// Base URL for the model API
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// Model name/identifier
    pub model: String,
    /// Optional system instructions overriding the default ones
    #[serde(default)]
    pub instructions: Option<String>,
    /// Tool discovery settings
    #[serde(default)]
    pub tools: ToolSettings,
}

impl ResolvedAgentConfig {
    /// Placeholder shipped in sample `.env` files; never a real key
    pub const PLACEHOLDER_API_KEY: &'static str = "sk-your-api-key-here";

    /// Create a new resolved agent config
    pub fn new(backend: AgentBackend, base_url: String, api_key: String, model: String) -> Self {
        Self {
            backend,
            base_url,
            api_key,
            model,
            instructions: None,
            tools: ToolSettings::default(),
        }
    }

    /// Set custom instructions
    pub fn with_instructions(mut self, instructions: String) -> Self {
        self.instructions = Some(instructions);
        self
    }

    /// Set tool settings
    pub fn with_tools(mut self, tools: ToolSettings) -> Self {
        self.tools = tools;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.is_empty() {
            return Err("API key cannot be empty".to_string());
        }

        if self.api_key == Self::PLACEHOLDER_API_KEY {
            return Err("API key is still the placeholder value".to_string());
        }

        if self.model.is_empty() {
            return Err("Model name cannot be empty".to_string());
        }

        if self.base_url.is_empty() {
            return Err("Base URL cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("Base URL must start with http:// or https://".to_string());
        }

        if let Some(weather) = &self.tools.weather {
            if !weather.base_url.starts_with("http://") && !weather.base_url.starts_with("https://")
            {
                return Err("Weather API base URL must start with http:// or https://".to_string());
            }
            if weather.timeout_secs <= 0.0 {
                return Err("Weather API timeout must be positive".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ResolvedAgentConfig {
        ResolvedAgentConfig::new(
            AgentBackend::FunctionTools,
            "https://api.openai.com/v1".to_string(),
            "sk-test".to_string(),
            "gpt-4o".to_string(),
        )
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_placeholder_key_rejected() {
        let mut cfg = config();
        cfg.api_key = ResolvedAgentConfig::PLACEHOLDER_API_KEY.to_string();
        assert!(cfg.validate().unwrap_err().contains("placeholder"));
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let mut cfg = config();
        cfg.base_url = "ftp://example.com".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_backend_aliases() {
        assert_eq!(AgentBackend::parse("openai"), Some(AgentBackend::FunctionTools));
        assert_eq!(AgentBackend::parse("Qwen"), Some(AgentBackend::BlockingTools));
        assert_eq!(AgentBackend::parse("dashscope"), Some(AgentBackend::BlockingTools));
        assert_eq!(AgentBackend::parse("other"), None);

        let backend: AgentBackend = serde_json::from_str("\"qwen\"").unwrap();
        assert_eq!(backend, AgentBackend::BlockingTools);
    }

    #[test]
    fn test_load_policy_defaults_to_skip() {
        let settings: ToolSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.load_policy, LoadPolicy::SkipBroken);
        assert!(settings.weather.is_none());
        assert_eq!(LoadPolicy::parse("fail_fast"), Some(LoadPolicy::FailFast));
    }
}
