use serde::Deserialize;
use serde_json::{json, Value};

use sg_domain::error::Result;
use sg_domain::tool::{Tool, ToolContext, ToolFailure, ToolOutcome};

#[derive(Deserialize)]
struct Params {
    location: String,
}

/// Current-conditions lookup. Real deployments would call an upstream
/// weather API keyed by `location`; this returns a fixed, plausible
/// reading so the dispatcher path can be exercised without network
/// access.
pub struct WeatherTool;

#[async_trait::async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get the current weather conditions for a named location."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "City or place name"}
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, params: Value, _context: &ToolContext) -> Result<ToolOutcome> {
        let params: Params = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(_) => return Ok(Err(ToolFailure::new("location is required"))),
        };

        Ok(Ok(json!({
            "location": params.location,
            "temperatureCelsius": 22,
            "conditions": "clear",
            "humidityPercent": 48,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ToolContext {
        ToolContext {
            session_id: "s1".into(),
            inference_config: Default::default(),
        }
    }

    #[tokio::test]
    async fn returns_weather_for_valid_location() {
        let tool = WeatherTool;
        let outcome = tool
            .execute(json!({"location": "Bengaluru"}), &ctx())
            .await
            .unwrap();
        let value = outcome.unwrap();
        assert_eq!(value["location"], "Bengaluru");
    }

    #[tokio::test]
    async fn missing_location_is_a_business_failure() {
        let tool = WeatherTool;
        let outcome = tool.execute(json!({}), &ctx()).await.unwrap();
        assert!(outcome.is_err());
    }
}
