//! The tool contract every callable tool implements, and the
//! process-wide registry the dispatcher resolves names against.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::InferenceConfig;

/// Inference knobs forwarded to a tool so it may pass them through to a
/// downstream LLM call of its own (e.g. the `reasoning` tool).
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub session_id: String,
    pub inference_config: InferenceConfig,
}

/// A business-level tool failure, distinct from the tool panicking or
/// returning an `Err` from `execute`. Carries through to the client as
/// `{error: true, message}`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolFailure {
    pub message: String,
}

impl ToolFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ToolFailure {}

/// The result a tool's `execute` produces: a JSON-serializable success
/// value, or a business-level failure. Both are delivered upstream as a
/// tool result (§4.6); only the failure case sets `error: true`.
pub type ToolOutcome = Result<Value, ToolFailure>;

/// A stable description of a tool, materialized for injection into the
/// model service's `promptStart` event.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's input, serialized as a string (the
    /// model service expects the schema embedded as text).
    pub schema: String,
}

/// A callable tool. Names are matched case-insensitively by the registry.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON Schema for the tool's input parameters.
    fn schema(&self) -> Value;

    async fn execute(&self, params: Value, context: &ToolContext) -> crate::error::Result<ToolOutcome>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            schema: self.schema().to_string(),
        }
    }
}

/// Raised by the registry when a tool name has no registered handler.
#[derive(Debug, Clone)]
pub struct UnknownTool(pub String);

impl std::fmt::Display for UnknownTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown tool: {}", self.0)
    }
}

impl std::error::Error for UnknownTool {}

impl From<UnknownTool> for crate::error::Error {
    fn from(err: UnknownTool) -> Self {
        crate::error::Error::Tool(err.to_string())
    }
}

/// Process-wide, immutable-after-startup registry of callable tools.
/// Name lookups are case-insensitive.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_ascii_lowercase(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(&name.to_ascii_lowercase())
    }

    /// Materializes `{name, description, schema}` for every registered
    /// tool, optionally filtered to an allowlist (`Session.enabledTools`).
    pub fn specs(&self, enabled: Option<&[String]>) -> Vec<ToolSpec> {
        let allow: Option<std::collections::HashSet<String>> = enabled
            .map(|names| names.iter().map(|n| n.to_ascii_lowercase()).collect());

        let mut specs: Vec<ToolSpec> = self
            .tools
            .iter()
            .filter(|(name, _)| allow.as_ref().is_none_or(|a| a.contains(*name)))
            .map(|(_, tool)| tool.spec())
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub async fn execute(
        &self,
        name: &str,
        params: Value,
        context: &ToolContext,
    ) -> crate::error::Result<ToolOutcome> {
        match self.get(name) {
            Some(tool) => tool.execute(params, context).await,
            None => Err(UnknownTool(name.to_string()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait::async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes its input"
        }
        fn schema(&self) -> Value {
            serde_json::json!({"type": "object"})
        }
        async fn execute(&self, params: Value, _ctx: &ToolContext) -> crate::error::Result<ToolOutcome> {
            Ok(Ok(params))
        }
    }

    fn ctx() -> ToolContext {
        ToolContext {
            session_id: "s1".into(),
            inference_config: InferenceConfig::default(),
        }
    }

    #[tokio::test]
    async fn register_and_lookup_is_case_insensitive() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(Echo));
        assert!(reg.has("Echo"));
        assert!(reg.has("ECHO"));
        assert!(reg.get("echo").is_some());
    }

    #[tokio::test]
    async fn execute_unknown_tool_yields_unknown_tool_error() {
        let reg = ToolRegistry::new();
        let error = reg.execute("nope", serde_json::json!({}), &ctx()).await.unwrap_err();
        assert!(error.is_unknown_tool());
    }

    #[tokio::test]
    async fn specs_filters_by_enabled_allowlist() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(Echo));
        assert_eq!(reg.specs(None).len(), 1);
        assert_eq!(reg.specs(Some(&["other".to_string()])).len(), 0);
        assert_eq!(reg.specs(Some(&["Echo".to_string()])).len(), 1);
    }
}
