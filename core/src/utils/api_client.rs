//! Generic HTTP API client
//!
//! Thin wrapper over `reqwest` with a base URL, default headers, a request
//! timeout and a fixed-delay retry on connection errors, timeouts and 5xx
//! responses.

use crate::error::ApiClientError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Result alias for API client calls
pub type ApiResult<T> = std::result::Result<T, ApiClientError>;

/// Client settings
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub default_headers: HashMap<String, String>,
    pub retry_count: u32,
    pub retry_delay: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: Duration::from_secs(30),
            default_headers: HashMap::new(),
            retry_count: 0,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// A decoded HTTP response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    /// JSON body when the response parsed as JSON, else the raw text as a string
    pub body: Value,
    pub raw_text: String,
}

impl ApiResponse {
    /// Whether the status is 2xx
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// JSON body, if the response carried a JSON object or array
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            Value::Object(_) | Value::Array(_) => Some(&self.body),
            _ => None,
        }
    }

    /// Raw text of the body
    pub fn text(&self) -> &str {
        &self.raw_text
    }
}

/// Options of a single request
#[derive(Debug, Default)]
pub struct RequestOptions<'a> {
    /// Query parameters; `None` values are dropped
    pub params: &'a [(&'a str, Option<String>)],
    /// Extra headers for this request only
    pub headers: &'a [(&'a str, &'a str)],
    /// JSON body
    pub json: Option<Value>,
    /// Turn non-2xx responses into [`ApiClientError::Http`]
    pub raise_for_status: bool,
}

/// HTTP API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiClientConfig,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client
    pub fn new(mut config: ApiClientConfig) -> ApiResult<Self> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiClientError::Connection {
                message: e.to_string(),
            })?;
        Ok(Self { config, http })
    }

    /// Client settings
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn set_bearer_token(&mut self, token: &str) {
        self.set_header(AUTHORIZATION.as_str(), &format!("Bearer {}", token));
    }

    /// Send a header with every request
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.config
            .default_headers
            .insert(name.to_string(), value.to_string());
        debug!(header = name, "Set default header");
    }

    /// Build the full URL for `path`
    pub fn build_url(&self, path: &str, params: &[(&str, Option<String>)]) -> ApiResult<Url> {
        let joined = if self.config.base_url.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
        };
        let mut url = Url::parse(&joined).map_err(|e| ApiClientError::InvalidUrl {
            message: format!("{}: {}", joined, e),
        })?;

        let present: Vec<_> = params
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (*k, v.as_str())))
            .collect();
        if !present.is_empty() {
            url.query_pairs_mut().extend_pairs(present);
        }
        Ok(url)
    }

    fn merge_headers(&self, extra: &[(&str, &str)]) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let pairs = self
            .config
            .default_headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(extra.iter().copied());

        for (name, value) in pairs {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ApiClientError::InvalidUrl {
                    message: format!("invalid header name '{}': {}", name, e),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| ApiClientError::InvalidUrl {
                message: format!("invalid header value: {}", e),
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    /// GET request
    pub async fn get(&self, path: &str, options: RequestOptions<'_>) -> ApiResult<ApiResponse> {
        self.request(Method::GET, path, options).await
    }

    /// POST request with a JSON body
    pub async fn post<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        mut options: RequestOptions<'_>,
    ) -> ApiResult<ApiResponse> {
        options.json = Some(serde_json::to_value(body).map_err(|e| ApiClientError::Decode {
            message: e.to_string(),
        })?);
        self.request(Method::POST, path, options).await
    }

    /// DELETE request
    pub async fn delete(&self, path: &str, options: RequestOptions<'_>) -> ApiResult<ApiResponse> {
        self.request(Method::DELETE, path, options).await
    }

    /// Send a request, retrying transient failures
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions<'_>,
    ) -> ApiResult<ApiResponse> {
        let url = self.build_url(path, options.params)?;
        let headers = self.merge_headers(options.headers)?;

        let mut attempt = 0;
        loop {
            let outcome = self
                .send_once(method.clone(), url.clone(), headers.clone(), &options)
                .await;

            let retryable = match &outcome {
                Ok(response) => response.status >= 500,
                Err(ApiClientError::Connection { .. }) | Err(ApiClientError::Timeout { .. }) => {
                    true
                }
                Err(_) => false,
            };

            if retryable && attempt < self.config.retry_count {
                attempt += 1;
                warn!(
                    method = %method,
                    url = %url,
                    attempt,
                    "Request failed, retrying in {:?}",
                    self.config.retry_delay
                );
                tokio::time::sleep(self.config.retry_delay).await;
                continue;
            }

            let response = outcome?;
            if options.raise_for_status && !response.ok() {
                return Err(ApiClientError::Http {
                    status: response.status,
                    body: response.raw_text,
                });
            }
            return Ok(response);
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        options: &RequestOptions<'_>,
    ) -> ApiResult<ApiResponse> {
        debug!(method = %method, url = %url, "Sending request");

        let mut builder = self.http.request(method, url).headers(headers);
        if let Some(json) = &options.json {
            builder = builder.json(json);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let raw_text = response.text().await.map_err(|e| self.classify(e))?;
        let body = serde_json::from_str(&raw_text).unwrap_or_else(|_| Value::String(raw_text.clone()));

        Ok(ApiResponse {
            status,
            headers,
            body,
            raw_text,
        })
    }

    fn classify(&self, err: reqwest::Error) -> ApiClientError {
        if err.is_timeout() {
            ApiClientError::Timeout {
                timeout_secs: self.config.timeout.as_secs_f64(),
            }
        } else if err.is_decode() {
            ApiClientError::Decode {
                message: err.to_string(),
            }
        } else {
            ApiClientError::Connection {
                message: err.to_string(),
            }
        }
    }
}
