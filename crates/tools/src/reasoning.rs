use serde::Deserialize;
use serde_json::{json, Value};

use sg_domain::error::Result;
use sg_domain::tool::{Tool, ToolContext, ToolFailure, ToolOutcome};

#[derive(Deserialize)]
struct Params {
    prompt: String,
}

/// Delegates a sub-question to a reasoning-capable LLM call, forwarding
/// the invoking session's inference knobs. The real call is stubbed;
/// this reflects the knobs it would have used back to the caller so
/// the dispatch path is observable.
pub struct ReasoningTool;

#[async_trait::async_trait]
impl Tool for ReasoningTool {
    fn name(&self) -> &str {
        "reasoning"
    }

    fn description(&self) -> &str {
        "Ask a reasoning model to work through a sub-question and return its conclusion."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "prompt": {"type": "string", "description": "The question to reason about"}
            },
            "required": ["prompt"]
        })
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> Result<ToolOutcome> {
        let params: Params = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(_) => return Ok(Err(ToolFailure::new("prompt is required"))),
        };

        if params.prompt.trim().is_empty() {
            return Ok(Err(ToolFailure::new("prompt must not be empty")));
        }

        Ok(Ok(json!({
            "conclusion": format!("Considered: {}", params.prompt),
            "maxTokens": context.inference_config.max_tokens,
            "temperature": context.inference_config.temperature,
        })))
    }
}
