//! City weather tool

use crate::error::{Error, Result, ToolError};
use crate::tools::function::required_str;
use crate::tools::{FunctionTool, ToolContext, ToolExport, ToolFn, ToolSource};
use crate::weather::WeatherService;
use serde_json::{json, Value};
use std::sync::Arc;

pub const TOOL_NAME: &str = "get_city_weather";

/// Build the weather tool around an injected service
pub fn weather_tool(service: Arc<WeatherService>) -> FunctionTool {
    let implementation = ToolFn::asynchronous(TOOL_NAME, move |args| {
        let service = Arc::clone(&service);
        async move {
            let city = required_str(&args, "city")?.trim().to_string();
            if city.is_empty() {
                return Ok::<_, Error>(Value::String(
                    "Error: city name must not be empty".to_string(),
                ));
            }
            let summary = service.get_weather_summary(&city).await?;
            Ok::<_, Error>(Value::String(summary))
        }
    });

    FunctionTool::new(
        TOOL_NAME,
        "Get the current weather of a city: temperature, feels-like temperature, \
         conditions, humidity, pressure and wind speed. Accepts Chinese or English \
         city names, e.g. \"Beijing\", \"New York\", \"Tokyo\".",
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "City name, e.g. \"Beijing\" or \"Shanghai\""
                }
            },
            "required": ["city"]
        }),
        implementation,
    )
}

pub struct WeatherToolSource;

impl ToolSource for WeatherToolSource {
    fn source_id(&self) -> &str {
        "weather_tool"
    }

    fn load(&self, ctx: &ToolContext) -> Result<Option<ToolExport>> {
        let service = ctx.weather.clone().ok_or_else(|| ToolError::Load {
            source_id: self.source_id().to_string(),
            message: "weather service not configured (set WEATHER_API_KEY)".to_string(),
        })?;
        Ok(Some(ToolExport::Single(Arc::new(weather_tool(service)))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeatherApiConfig;
    use crate::tools::{wrap, BlockingTool, Tool, ToolCall};
    use crate::weather::WeatherApiClient;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(base_url: String) -> Arc<WeatherService> {
        let mut config = WeatherApiConfig::new(base_url, "key".to_string());
        config.retry_count = 0;
        Arc::new(WeatherService::new(WeatherApiClient::new(&config).unwrap()))
    }

    async fn mock_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Beijing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "main": {"temp": 30, "feels_like": 33, "humidity": 70, "pressure": 1000},
                "weather": [{"description": "haze"}],
                "wind": {"speed": 1.5}
            })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_native_call() {
        let server = mock_server().await;
        let tool = weather_tool(service(server.uri()));

        let result = tool
            .execute(ToolCall::new(TOOL_NAME, json!({"city": "Beijing"})))
            .await
            .unwrap();
        assert!(result.content.contains("Conditions: haze"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_bridged_call_matches_native_call() {
        let server = mock_server().await;
        let tool: Arc<dyn Tool> = Arc::new(weather_tool(service(server.uri())));

        let native = tool
            .execute(ToolCall::new(TOOL_NAME, json!({"city": "Beijing"})))
            .await
            .unwrap()
            .content;
        let bridged = wrap(&tool).unwrap();

        assert_eq!(bridged.bound_ident(), TOOL_NAME);
        assert_eq!(bridged.call(r#"{"city": "Beijing"}"#), native);
    }

    #[tokio::test]
    async fn test_blank_city() {
        let tool = weather_tool(service("http://127.0.0.1:9".to_string()));
        let result = tool
            .execute(ToolCall::new(TOOL_NAME, json!({"city": "  "})))
            .await
            .unwrap();
        assert_eq!(result.content, "Error: city name must not be empty");
    }

    #[test]
    fn test_source_requires_service() {
        let err = WeatherToolSource
            .load(&ToolContext::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("WEATHER_API_KEY"));
    }
}
