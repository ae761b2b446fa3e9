use serde::Deserialize;
use serde_json::{json, Value};

use sg_domain::error::Result;
use sg_domain::tool::{Tool, ToolContext, ToolFailure, ToolOutcome};

#[derive(Deserialize)]
struct Params {
    location: String,
}

/// Resolves a place name to coordinates. A deterministic hash of the
/// input stands in for a real geocoding API call.
pub struct GeocodingTool;

#[async_trait::async_trait]
impl Tool for GeocodingTool {
    fn name(&self) -> &str {
        "geocode_location"
    }

    fn description(&self) -> &str {
        "Resolve a place name to latitude/longitude coordinates."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "Place name to resolve"}
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, params: Value, _context: &ToolContext) -> Result<ToolOutcome> {
        let params: Params = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(_) => return Ok(Err(ToolFailure::new("location is required"))),
        };

        let hash: u32 = params.location.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
        let lat = -90.0 + (hash % 18000) as f64 / 100.0;
        let lon = -180.0 + (hash.wrapping_div(7) % 36000) as f64 / 100.0;

        Ok(Ok(json!({
            "location": params.location,
            "latitude": lat,
            "longitude": lon,
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
    async fn resolves_coordinates_deterministically() {
        let tool = GeocodingTool;
        let a = tool.execute(json!({"location": "Mangaluru"}), &ctx()).await.unwrap().unwrap();
        let b = tool.execute(json!({"location": "Mangaluru"}), &ctx()).await.unwrap().unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn missing_location_is_a_business_failure() {
        let tool = GeocodingTool;
        let outcome = tool.execute(json!({}), &ctx()).await.unwrap();
        assert!(outcome.is_err());
    }
}
