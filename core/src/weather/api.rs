//! OpenWeatherMap-compatible API client

use crate::config::WeatherApiConfig;
use crate::error::ApiClientError;
use crate::utils::api_client::{ApiClient, ApiClientConfig, ApiResult, RequestOptions};
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

/// Client for the `/weather` endpoint
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    client: ApiClient,
    api_key: String,
}

impl WeatherApiClient {
    /// Create a client from configuration
    pub fn new(config: &WeatherApiConfig) -> ApiResult<Self> {
        let client = ApiClient::new(ApiClientConfig {
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            retry_count: config.retry_count,
            retry_delay: Duration::from_secs(1),
            ..ApiClientConfig::default()
        })?;
        info!(base_url = %config.base_url, "Initialized weather API client");

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
        })
    }

    /// Whether the API answers a simple query
    pub async fn health_check(&self) -> bool {
        let params = [
            ("q", Some("London".to_string())),
            ("appid", Some(self.api_key.clone())),
        ];
        match self
            .client
            .get(
                "/weather",
                RequestOptions {
                    params: &params,
                    ..Default::default()
                },
            )
            .await
        {
            Ok(response) => response.ok(),
            Err(e) => {
                error!("Weather API health check failed: {}", e);
                false
            }
        }
    }

    /// Current weather of `city`; `units` is `metric`, `imperial` or `standard`
    pub async fn get_weather(&self, city: &str, units: &str) -> ApiResult<Value> {
        info!(city, units, "Fetching weather");

        let params = [
            ("q", Some(city.to_string())),
            ("appid", Some(self.api_key.clone())),
            ("units", Some(units.to_string())),
            ("lang", Some("en".to_string())),
        ];
        let response = self
            .client
            .get(
                "/weather",
                RequestOptions {
                    params: &params,
                    raise_for_status: true,
                    ..Default::default()
                },
            )
            .await?;

        match response.json() {
            Some(body) => Ok(body.clone()),
            None => Err(ApiClientError::Decode {
                message: format!("expected a JSON object, got: {}", response.text()),
            }),
        }
    }
}
