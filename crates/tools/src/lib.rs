//! Concrete tool implementations the dispatcher (in `sg-sessions`) calls
//! into, plus the process-wide default registry.
//!
//! Each tool's body is a minimal, reentrant stand-in sufficient to
//! exercise the dispatcher end to end; none of them perform real
//! upstream HTTP/cloud calls.

pub mod datetime;
pub mod geocoding;
pub mod knowledge_base;
pub mod reasoning;
pub mod weather;
pub mod wikipedia;

use std::sync::Arc;

use sg_domain::tool::ToolRegistry;

/// Builds the registry with every built-in tool registered under its
/// canonical name.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(weather::WeatherTool));
    registry.register(Arc::new(wikipedia::WikipediaTool));
    registry.register(Arc::new(geocoding::GeocodingTool));
    registry.register(Arc::new(knowledge_base::KnowledgeBaseTool));
    registry.register(Arc::new(reasoning::ReasoningTool));
    registry.register(Arc::new(datetime::DatetimeTool));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_all_six_tools() {
        let reg = default_registry();
        for name in [
            "get_weather",
            "search_wikipedia",
            "geocode_location",
            "search_knowledge_base",
            "reasoning",
            "get_current_datetime",
        ] {
            assert!(reg.has(name), "missing tool {name}");
        }
    }
}
