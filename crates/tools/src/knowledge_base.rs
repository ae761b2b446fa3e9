use serde::Deserialize;
use serde_json::{json, Value};

use sg_domain::error::Result;
use sg_domain::tool::{Tool, ToolContext, ToolFailure, ToolOutcome};

#[derive(Deserialize)]
struct Params {
    query: String,
}

/// Retrieval-augmented lookup against a knowledge base. Stands in for a
/// real RAG call with a small fixed lookup table plus a generic
/// fallback for anything it doesn't recognize.
pub struct KnowledgeBaseTool;

const ENTRIES: &[(&str, &str)] = &[("borewell pump", "KS7, KS9, KP3S")];

#[async_trait::async_trait]
impl Tool for KnowledgeBaseTool {
    fn name(&self) -> &str {
        "search_knowledge_base"
    }

    fn description(&self) -> &str {
        "Search the product knowledge base for an answer to the given query."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Natural-language question"}
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: Value, _context: &ToolContext) -> Result<ToolOutcome> {
        let params: Params = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(_) => return Ok(Err(ToolFailure::new("query is required"))),
        };

        let query_lower = params.query.to_ascii_lowercase();
        let answer = ENTRIES
            .iter()
            .find(|(key, _)| query_lower.contains(key))
            .map(|(_, answer)| answer.to_string())
            .unwrap_or_else(|| "No matching entry found in the knowledge base.".to_string());

        Ok(Ok(json!({
            "answer": answer,
            "fromKnowledgeBase": true,
        })))
    }
}
