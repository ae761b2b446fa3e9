use serde::Deserialize;
use serde_json::{json, Value};

use sg_domain::error::Result;
use sg_domain::tool::{Tool, ToolContext, ToolFailure, ToolOutcome};

#[derive(Deserialize, Default)]
struct Params {
    #[serde(default)]
    timezone_offset_hours: Option<i64>,
}

/// Current date/time, optionally shifted by a fixed UTC offset. Covers
/// the "what day is it" / simple date-arithmetic class of requests.
pub struct DatetimeTool;

#[async_trait::async_trait]
impl Tool for DatetimeTool {
    fn name(&self) -> &str {
        "get_current_datetime"
    }

    fn description(&self) -> &str {
        "Get the current date and time, optionally in a given UTC offset."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "timezoneOffsetHours": {
                    "type": "integer",
                    "description": "Hours offset from UTC, e.g. 5 for IST-ish rounding"
                }
            }
        })
    }

    async fn execute(&self, params: Value, _context: &ToolContext) -> Result<ToolOutcome> {
        let params: Params = if params.is_null() {
            Params::default()
        } else {
            match serde_json::from_value(params) {
                Ok(p) => p,
                Err(_) => return Ok(Err(ToolFailure::new("timezoneOffsetHours must be an integer"))),
            }
        };

        let offset = params.timezone_offset_hours.unwrap_or(0);
        if !(-12..=14).contains(&offset) {
            return Ok(Err(ToolFailure::new("timezoneOffsetHours out of range")));
        }

        let now = chrono::Utc::now() + chrono::Duration::hours(offset);

        Ok(Ok(json!({
            "iso8601": now.to_rfc3339(),
            "timezoneOffsetHours": offset,
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
    async fn defaults_to_utc() {
        let tool = DatetimeTool;
        let outcome = tool.execute(json!({}), &ctx()).await.unwrap();
        let value = outcome.unwrap();
        assert_eq!(value["timezoneOffsetHours"], 0);
    }

    #[tokio::test]
    async fn rejects_out_of_range_offset() {
        let tool = DatetimeTool;
        let outcome = tool
            .execute(json!({"timezoneOffsetHours": 99}), &ctx())
            .await
            .unwrap();
        assert!(outcome.is_err());
    }
}
