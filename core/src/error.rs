//! Error types and handling for work-agent core

use thiserror::Error;

/// Result type alias for work-agent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for work-agent core
#[derive(Error, Debug)]
pub enum Error {
    /// Tool discovery, bridging and execution errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// External API errors
    #[error("API error: {0}")]
    Api(#[from] ApiClientError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Tool errors.
///
/// `Load` is recoverable during discovery; `NameConflict` and
/// `UnsupportedShape` are fatal at startup. The remaining variants happen per
/// call and are turned into text by the bridge.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to load tool source '{source_id}': {message}")]
    Load { source_id: String, message: String },

    #[error(
        "Tool name conflict: '{name}' from source '{source_id}' is already registered by source '{existing_source}'"
    )]
    NameConflict {
        name: String,
        source_id: String,
        existing_source: String,
    },

    #[error("Unsupported tool shape: {shape} exposes no callable")]
    UnsupportedShape { shape: String },

    #[error("Tool not found: {name}")]
    NotFound { name: String },

    #[error("Tool execution failed: {name} - {message}")]
    ExecutionFailed { name: String, message: String },

    #[error("Invalid tool parameters: {message}")]
    InvalidParameters { message: String },

    #[error("Malformed tool arguments: {message}")]
    ArgumentParse { message: String },

    #[error(
        "Tool {name} returned a pending result inside a current-thread runtime; \
         blocking here would deadlock, use call_async instead"
    )]
    BlockingUnsupported { name: String },
}

/// HTTP API client errors
#[derive(Error, Debug)]
pub enum ApiClientError {
    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: f64 },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },
}

impl ApiClientError {
    /// HTTP status code carried by the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl Error {
    /// Failure text shown to a model: the underlying cause without the
    /// category prefix of `Display`
    pub fn reason(&self) -> String {
        match self {
            Error::Tool(ToolError::ExecutionFailed { message, .. }) => message.clone(),
            Error::Tool(e) => e.to_string(),
            Error::Api(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
