use serde::Deserialize;
use serde_json::{json, Value};

use sg_domain::error::Result;
use sg_domain::tool::{Tool, ToolContext, ToolFailure, ToolOutcome};

#[derive(Deserialize)]
struct Params {
    query: String,
}

/// Encyclopedia lookup by free-text query. Returns a fixed summary
/// rather than calling the real Wikipedia API.
pub struct WikipediaTool;

#[async_trait::async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "search_wikipedia"
    }

    fn description(&self) -> &str {
        "Search Wikipedia and return a short summary of the best-matching article."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Search terms"}
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: Value, _context: &ToolContext) -> Result<ToolOutcome> {
        let params: Params = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(_) => return Ok(Err(ToolFailure::new("query is required"))),
        };

        if params.query.trim().is_empty() {
            return Ok(Err(ToolFailure::new("query must not be empty")));
        }

        Ok(Ok(json!({
            "title": params.query,
            "summary": format!("{} is a topic with a dedicated Wikipedia article.", params.query),
            "url": format!("https://en.wikipedia.org/wiki/{}", params.query.replace(' ', "_")),
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
    async fn returns_summary_for_query() {
        let tool = WikipediaTool;
        let outcome = tool.execute(json!({"query": "Rust"}), &ctx()).await.unwrap();
        let value = outcome.unwrap();
        assert_eq!(value["title"], "Rust");
    }

    #[tokio::test]
    async fn empty_query_is_a_business_failure() {
        let tool = WikipediaTool;
        let outcome = tool.execute(json!({"query": ""}), &ctx()).await.unwrap();
        assert!(outcome.is_err());
    }
}
