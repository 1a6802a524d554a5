//! CLI configuration loader for work-agent
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./work-agent.json or ./.work-agent/config.json
//! 3. Git repository root: <repo_root>/.work-agent/config.json
//! 4. XDG config: <config_dir>/work-agent/config.json
//! 5. Environment variables only (no files)
//!
//! Tool settings (weather API, load policy) fall back to the environment
//! whenever the selected file leaves them out.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use work_agent_core::{
    AgentBackend, LoadPolicy, ResolvedAgentConfig, ToolSettings, WeatherApiConfig,
};

const CONFIG_FILE_NAME: &str = "work-agent.json";
const CONFIG_DIR_NAME: &str = ".work-agent";
const XDG_APP_DIR: &str = "work-agent";

/// Raw weather section of a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawWeatherConfig {
    /// API key (can be "env:VAR_NAME")
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<f64>,
    pub retry_count: Option<u32>,
}

/// Raw tools section of a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawToolsConfig {
    /// "skip_broken" or "fail_fast"
    pub load_policy: Option<String>,
    pub weather: Option<RawWeatherConfig>,
}

/// Raw configuration file format (simple single-file schema)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    /// Backend to use ("function_tools"/"openai" or "blocking_tools"/"qwen")
    pub backend: Option<String>,
    /// API key (can be "env:VAR_NAME" for environment variable)
    pub api_key: Option<String>,
    /// Base URL (optional, uses backend default if not specified)
    pub base_url: Option<String>,
    /// Model name (optional, uses backend default if not specified)
    pub model: Option<String>,
    /// Custom agent instructions
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: RawToolsConfig,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// CLI configuration loader
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    backend_override: Option<String>,
    api_key_override: Option<String>,
    base_url_override: Option<String>,
    model_override: Option<String>,
    /// Directory the search starts from (defaults to the current directory)
    working_dir: Option<PathBuf>,
    /// Global config directory (defaults to `dirs::config_dir()`)
    xdg_dir: Option<Option<PathBuf>>,
    env: EnvLookup,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            config_override: None,
            backend_override: None,
            api_key_override: None,
            base_url_override: None,
            model_override: None,
            working_dir: None,
            xdg_dir: None,
            env: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set backend override
    pub fn with_backend_override(mut self, backend: String) -> Self {
        self.backend_override = Some(backend);
        self
    }

    /// Set API key override
    pub fn with_api_key_override(mut self, api_key: String) -> Self {
        self.api_key_override = Some(api_key);
        self
    }

    /// Set base URL override
    pub fn with_base_url_override(mut self, base_url: String) -> Self {
        self.base_url_override = Some(base_url);
        self
    }

    /// Set model override
    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    /// Search for config files starting from `dir`
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    /// Use `dir` as the global config directory; `None` disables that step
    pub fn with_xdg_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.xdg_dir = Some(dir);
        self
    }

    /// Read environment variables from `vars` instead of the process environment
    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Box::new(move |key| vars.get(key).cloned());
        self
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.env)(key).filter(|v| !v.trim().is_empty())
    }

    /// Load and resolve the full agent configuration
    pub async fn load(&self) -> Result<ResolvedAgentConfig> {
        let raw = self.load_raw().await?;
        let tools = self.resolve_tools(&raw.tools)?;
        let raw = match raw.api_key {
            Some(_) => raw,
            None => self.fill_from_env(raw)?,
        };
        self.resolve_config(raw, tools)
    }

    /// Load only the tool settings; no model credentials are required
    pub async fn load_tool_settings(&self) -> Result<ToolSettings> {
        let raw = self.load_raw().await?;
        self.resolve_tools(&raw.tools)
    }

    /// Find the raw config and apply flag overrides
    async fn load_raw(&self) -> Result<RawConfig> {
        // Step 1: Find and load base configuration
        let mut config = if let Some(override_path) = &self.config_override {
            self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?
        } else {
            self.search_and_load().await?.unwrap_or_default()
        };

        // Step 2: Apply flag overrides
        if let Some(backend) = &self.backend_override {
            config.backend = Some(backend.clone());
        }
        if let Some(api_key) = &self.api_key_override {
            config.api_key = Some(api_key.clone());
        }
        if let Some(base_url) = &self.base_url_override {
            config.base_url = Some(base_url.clone());
        }
        if let Some(model) = &self.model_override {
            config.model = Some(model.clone());
        }

        Ok(config)
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<Option<RawConfig>> {
        let cwd = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        // 1. Current working directory
        for candidate in [
            cwd.join(CONFIG_FILE_NAME),
            cwd.join(CONFIG_DIR_NAME).join("config.json"),
        ] {
            if candidate.exists() {
                return Ok(Some(self.load_file(&candidate).await?));
            }
        }

        // 2. Git repository root
        if let Some(git_root) = find_git_root(&cwd) {
            let config_path = git_root.join(CONFIG_DIR_NAME).join("config.json");
            if config_path.exists() {
                return Ok(Some(self.load_file(&config_path).await?));
            }
        }

        // 3. XDG config directory
        if let Some(config_dir) = self.xdg_config_dir() {
            let config_path = config_dir.join(XDG_APP_DIR).join("config.json");
            if config_path.exists() {
                return Ok(Some(self.load_file(&config_path).await?));
            }
        }

        // 4. Environment variables only
        debug!("No config file found, using environment only");
        Ok(None)
    }

    fn xdg_config_dir(&self) -> Option<PathBuf> {
        match &self.xdg_dir {
            Some(dir) => dir.clone(),
            None => dirs::config_dir(),
        }
    }

    /// Complete a config that has no API key from environment variables
    fn fill_from_env(&self, mut config: RawConfig) -> Result<RawConfig> {
        let openai_key = self.var("OPENAI_API_KEY");
        let dashscope_key = self.var("DASHSCOPE_API_KEY");

        let available: Vec<AgentBackend> = [
            openai_key.as_ref().map(|_| AgentBackend::FunctionTools),
            dashscope_key.as_ref().map(|_| AgentBackend::BlockingTools),
        ]
        .into_iter()
        .flatten()
        .collect();
        let available_names = || {
            available
                .iter()
                .map(|b| b.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let preference = config.backend.clone().or_else(|| self.var("WORK_AGENT_BACKEND"));
        let backend = match preference {
            Some(preferred) => {
                let backend = parse_backend(&preferred)?;
                if !available.contains(&backend) {
                    return Err(anyhow!(
                        "Backend '{}' specified but no corresponding API key found. Available keys: {}",
                        preferred,
                        available_names()
                    ));
                }
                backend
            }
            None => match available.as_slice() {
                [] => return Err(anyhow!(
                    "No configuration found. Please create a work-agent.json file or set OPENAI_API_KEY or DASHSCOPE_API_KEY"
                )),
                [only] => *only,
                _ => return Err(anyhow!(
                    "Multiple API keys detected: {}. Please specify which backend to use with WORK_AGENT_BACKEND or --backend",
                    available_names()
                )),
            },
        };

        config.api_key = match backend {
            AgentBackend::FunctionTools => openai_key,
            AgentBackend::BlockingTools => dashscope_key,
        };
        config.backend = Some(backend.as_str().to_string());
        if config.base_url.is_none() {
            config.base_url = self.var("WORK_AGENT_BASE_URL");
        }
        if config.model.is_none() {
            config.model = self.var("WORK_AGENT_MODEL");
        }
        Ok(config)
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            let config_file = path.join("config.json");
            if config_file.exists() {
                self.load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        debug!(path = %path.display(), "Loading config file");
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Resolve an "env:VAR" reference
    fn resolve_secret(&self, value: &str) -> Result<String> {
        match value.strip_prefix("env:") {
            Some(var_name) => self
                .var(var_name)
                .ok_or_else(|| anyhow!("Environment variable not found: {}", var_name)),
            None => Ok(value.to_string()),
        }
    }

    /// Resolve the tools section, falling back to environment variables
    fn resolve_tools(&self, raw: &RawToolsConfig) -> Result<ToolSettings> {
        let policy_name = self
            .var("WORK_AGENT_TOOL_POLICY")
            .or_else(|| raw.load_policy.clone());
        let load_policy = match policy_name {
            Some(name) => LoadPolicy::parse(&name)
                .ok_or_else(|| anyhow!("Unknown tool load policy: {}", name))?,
            None => LoadPolicy::default(),
        };

        let section = raw.weather.clone().unwrap_or_default();
        let api_key = match &section.api_key {
            Some(key) => Some(self.resolve_secret(key)?),
            None => self.var("WEATHER_API_KEY"),
        };

        let weather = match api_key {
            Some(api_key) => {
                let base_url = section
                    .base_url
                    .or_else(|| self.var("WEATHER_API_BASE_URL"))
                    .unwrap_or_else(|| WeatherApiConfig::DEFAULT_BASE_URL.to_string());
                let mut weather = WeatherApiConfig::new(base_url, api_key);

                let timeout = match section.timeout_secs {
                    Some(secs) => Some(secs),
                    None => self
                        .var("WEATHER_API_TIMEOUT")
                        .map(|v| {
                            v.trim()
                                .parse::<f64>()
                                .with_context(|| format!("Invalid WEATHER_API_TIMEOUT: {}", v))
                        })
                        .transpose()?,
                };
                if let Some(secs) = timeout {
                    weather.timeout_secs = secs;
                }
                if let Some(retries) = section.retry_count {
                    weather.retry_count = retries;
                }
                Some(weather)
            }
            None => None,
        };

        Ok(ToolSettings {
            load_policy,
            weather,
        })
    }

    /// Resolve raw config to ResolvedAgentConfig
    fn resolve_config(&self, config: RawConfig, tools: ToolSettings) -> Result<ResolvedAgentConfig> {
        let backend = match &config.backend {
            Some(name) => parse_backend(name)?,
            None => AgentBackend::FunctionTools,
        };

        let api_key = match &config.api_key {
            Some(key) => self.resolve_secret(key)?,
            None => String::new(),
        };

        let base_url = config
            .base_url
            .unwrap_or_else(|| backend.default_base_url().to_string());
        let model = config
            .model
            .unwrap_or_else(|| backend.default_model().to_string());

        let mut resolved = ResolvedAgentConfig::new(backend, base_url, api_key, model).with_tools(tools);
        if let Some(instructions) = config.instructions {
            resolved = resolved.with_instructions(instructions);
        }

        resolved
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        Ok(resolved)
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_backend(name: &str) -> Result<AgentBackend> {
    AgentBackend::parse(name).ok_or_else(|| anyhow!("Unknown backend: {}", name))
}

/// Find git repository root
fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn loader(dir: &TempDir, vars: &[(&str, &str)]) -> CliConfigLoader {
        CliConfigLoader::new()
            .with_working_dir(dir.path().to_path_buf())
            .with_xdg_dir(None)
            .with_env(env(vars))
    }

    fn write(path: PathBuf, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_env_only_single_key() {
        let dir = TempDir::new().unwrap();
        let config = loader(&dir, &[("DASHSCOPE_API_KEY", "sk-qwen")])
            .load()
            .await
            .unwrap();

        assert_eq!(config.backend, AgentBackend::BlockingTools);
        assert_eq!(config.api_key, "sk-qwen");
        assert_eq!(config.model, "qwen-plus");
        assert!(config.tools.weather.is_none());
    }

    #[tokio::test]
    async fn test_env_only_requires_backend_choice_with_two_keys() {
        let dir = TempDir::new().unwrap();
        let vars = [("OPENAI_API_KEY", "sk-a"), ("DASHSCOPE_API_KEY", "sk-b")];

        let err = loader(&dir, &vars).load().await.unwrap_err();
        assert!(err.to_string().contains("Multiple API keys"));

        let config = loader(&dir, &vars)
            .with_backend_override("openai".to_string())
            .load()
            .await
            .unwrap();
        assert_eq!(config.backend, AgentBackend::FunctionTools);
        assert_eq!(config.api_key, "sk-a");
    }

    #[tokio::test]
    async fn test_no_configuration() {
        let dir = TempDir::new().unwrap();
        let err = loader(&dir, &[]).load().await.unwrap_err();
        assert!(err.to_string().contains("No configuration found"));
    }

    #[tokio::test]
    async fn test_cwd_file_with_env_indirection() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path().join("work-agent.json"),
            r#"{
                "backend": "function_tools",
                "api_key": "env:MY_KEY",
                "model": "gpt-4o-mini",
                "instructions": "Be brief",
                "tools": {
                    "load_policy": "fail_fast",
                    "weather": {"api_key": "env:MY_WEATHER", "timeout_secs": 5}
                }
            }"#,
        );

        let config = loader(&dir, &[("MY_KEY", "sk-real"), ("MY_WEATHER", "w-key")])
            .load()
            .await
            .unwrap();

        assert_eq!(config.api_key, "sk-real");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.instructions.as_deref(), Some("Be brief"));
        assert_eq!(config.tools.load_policy, LoadPolicy::FailFast);

        let weather = config.tools.weather.unwrap();
        assert_eq!(weather.api_key, "w-key");
        assert_eq!(weather.timeout_secs, 5.0);
        assert_eq!(weather.base_url, WeatherApiConfig::DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_dot_dir_config_and_flag_overrides() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path().join(".work-agent").join("config.json"),
            r#"{"backend": "qwen", "api_key": "sk-file"}"#,
        );

        let config = loader(&dir, &[])
            .with_model_override("qwen-max".to_string())
            .with_base_url_override("http://localhost:8000/v1".to_string())
            .load()
            .await
            .unwrap();

        assert_eq!(config.backend, AgentBackend::BlockingTools);
        assert_eq!(config.model, "qwen-max");
        assert_eq!(config.base_url, "http://localhost:8000/v1");
    }

    #[tokio::test]
    async fn test_git_root_config() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        write(
            dir.path().join(".work-agent").join("config.json"),
            r#"{"api_key": "sk-root"}"#,
        );
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = CliConfigLoader::new()
            .with_working_dir(nested)
            .with_xdg_dir(None)
            .with_env(HashMap::new())
            .load()
            .await
            .unwrap();
        assert_eq!(config.api_key, "sk-root");
        assert_eq!(config.backend, AgentBackend::FunctionTools);
    }

    #[tokio::test]
    async fn test_xdg_config() {
        let dir = TempDir::new().unwrap();
        let xdg = TempDir::new().unwrap();
        write(
            xdg.path().join("work-agent").join("config.json"),
            r#"{"api_key": "sk-global"}"#,
        );

        let config = loader(&dir, &[])
            .with_xdg_dir(Some(xdg.path().to_path_buf()))
            .load()
            .await
            .unwrap();
        assert_eq!(config.api_key, "sk-global");
    }

    #[tokio::test]
    async fn test_placeholder_key_rejected() {
        let dir = TempDir::new().unwrap();
        let err = loader(&dir, &[("OPENAI_API_KEY", "sk-your-api-key-here")])
            .load()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[tokio::test]
    async fn test_config_override_missing_path() {
        let dir = TempDir::new().unwrap();
        let err = loader(&dir, &[])
            .with_config_override(dir.path().join("nope.json"))
            .load()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("override path"));
    }

    #[tokio::test]
    async fn test_tool_settings_from_env_without_credentials() {
        let dir = TempDir::new().unwrap();
        let settings = loader(
            &dir,
            &[
                ("WEATHER_API_KEY", "w"),
                ("WEATHER_API_BASE_URL", "http://localhost:1234"),
                ("WEATHER_API_TIMEOUT", "2.5"),
                ("WORK_AGENT_TOOL_POLICY", "skip_broken"),
            ],
        )
        .load_tool_settings()
        .await
        .unwrap();

        let weather = settings.weather.unwrap();
        assert_eq!(weather.base_url, "http://localhost:1234");
        assert_eq!(weather.timeout_secs, 2.5);
        assert_eq!(settings.load_policy, LoadPolicy::SkipBroken);
    }

    #[tokio::test]
    async fn test_invalid_tool_policy() {
        let dir = TempDir::new().unwrap();
        let err = loader(&dir, &[("WORK_AGENT_TOOL_POLICY", "sometimes")])
            .load_tool_settings()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown tool load policy"));
    }
}
