use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Observability configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Logging configuration. The gateway always logs through `tracing`;
/// this controls verbosity and whether output is JSON (prod) or
/// human-readable (dev).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// `RUST_LOG`-style filter directive, e.g. `"info"` or `"voicegate=debug,tower_http=warn"`.
    #[serde(default = "d_log_level")]
    pub log_level: String,

    /// Emit structured JSON log lines instead of the human-readable formatter.
    #[serde(default = "d_json")]
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: d_log_level(),
            json: d_json(),
        }
    }
}

fn d_log_level() -> String {
    "info".into()
}

fn d_json() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_level_is_info() {
        assert_eq!(ObservabilityConfig::default().log_level, "info");
    }

    #[test]
    fn default_json_is_true() {
        assert!(ObservabilityConfig::default().json);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: ObservabilityConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.json);
    }

    #[test]
    fn deserialize_override() {
        let cfg: ObservabilityConfig =
            serde_json::from_str(r#"{"log_level":"debug","json":false}"#).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert!(!cfg.json);
    }
}
