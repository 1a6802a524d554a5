//! Weather business service

use super::api::WeatherApiClient;
use crate::error::{ApiClientError, Result};
use serde_json::Value;
use std::fmt::Write as _;
use tracing::{error, info};

/// Formats weather API data for agents
#[derive(Debug, Clone)]
pub struct WeatherService {
    api: WeatherApiClient,
}

impl WeatherService {
    pub fn new(api: WeatherApiClient) -> Self {
        Self { api }
    }

    /// Multi-line weather summary for `city`
    pub async fn get_weather_summary(&self, city: &str) -> Result<String> {
        info!(city, "Fetching weather summary");

        let data = self.api.get_weather(city, "metric").await.map_err(|e| {
            error!(city, "Failed to fetch weather: {}", e);
            e
        })?;

        let summary = format_summary(city, &data)?;
        Ok(summary)
    }
}

fn field<'a>(data: &'a Value, pointer: &str) -> std::result::Result<&'a Value, ApiClientError> {
    data.pointer(pointer).ok_or_else(|| ApiClientError::Decode {
        message: format!("weather response is missing {}", pointer),
    })
}

fn format_summary(city: &str, data: &Value) -> std::result::Result<String, ApiClientError> {
    let temp = field(data, "/main/temp")?;
    let feels_like = field(data, "/main/feels_like")?;
    let humidity = field(data, "/main/humidity")?;
    let pressure = field(data, "/main/pressure")?;
    let description = field(data, "/weather/0/description")?;
    let wind_speed = field(data, "/wind/speed")?;

    let description = description.as_str().unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(out, "{} weather:\n", city);
    let _ = writeln!(out, "Temperature: {}°C (feels like {}°C)", temp, feels_like);
    let _ = writeln!(out, "Conditions: {}", description);
    let _ = writeln!(out, "Humidity: {}%", humidity);
    let _ = writeln!(out, "Pressure: {} hPa", pressure);
    let _ = writeln!(out, "Wind speed: {} m/s", wind_speed);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeatherApiConfig;
    use crate::error::Error;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample() -> Value {
        json!({
            "main": {"temp": 21.5, "feels_like": 20.9, "humidity": 40, "pressure": 1012},
            "weather": [{"description": "clear sky"}],
            "wind": {"speed": 3.2}
        })
    }

    fn service(base_url: String) -> WeatherService {
        let mut config = WeatherApiConfig::new(base_url, "test-key".to_string());
        config.retry_count = 0;
        WeatherService::new(WeatherApiClient::new(&config).unwrap())
    }

    #[test]
    fn test_format_summary() {
        let summary = format_summary("Beijing", &sample()).unwrap();
        assert!(summary.starts_with("Beijing weather:"));
        assert!(summary.contains("Temperature: 21.5°C (feels like 20.9°C)"));
        assert!(summary.contains("Conditions: clear sky"));
        assert!(summary.contains("Wind speed: 3.2 m/s"));
    }

    #[test]
    fn test_format_summary_missing_field() {
        let err = format_summary("Beijing", &json!({"main": {}})).unwrap_err();
        assert!(err.to_string().contains("/main/temp"));
    }

    #[tokio::test]
    async fn test_summary_from_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Beijing"))
            .and(query_param("appid", "test-key"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample()))
            .mount(&server)
            .await;

        let summary = service(server.uri())
            .get_weather_summary("Beijing")
            .await
            .unwrap();
        assert!(summary.contains("Humidity: 40%"));
    }

    #[tokio::test]
    async fn test_api_errors_surface() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let err = service(server.uri())
            .get_weather_summary("Nowhere")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiClientError::Http { status: 401, .. })));
    }
}
