use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Model service connection configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Connection parameters for the remote speech-to-speech model service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelServiceConfig {
    #[serde(default = "d_region")]
    pub region: String,

    #[serde(default)]
    pub knowledge_base_id: Option<String>,

    #[serde(default)]
    pub model_arn: Option<String>,

    /// Connection timeout for both request setup and the overall session, in seconds.
    #[serde(default = "d_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// HTTP/2 concurrent duplex streams capped process-wide.
    #[serde(default = "d_max_concurrent_streams_server")]
    pub max_concurrent_streams_server: u32,

    /// HTTP/2 concurrent duplex streams capped per region-scoped client.
    #[serde(default = "d_max_concurrent_streams_per_region")]
    pub max_concurrent_streams_per_region: u32,
}

impl Default for ModelServiceConfig {
    fn default() -> Self {
        Self {
            region: d_region(),
            knowledge_base_id: None,
            model_arn: None,
            connect_timeout_secs: d_connect_timeout_secs(),
            max_concurrent_streams_server: d_max_concurrent_streams_server(),
            max_concurrent_streams_per_region: d_max_concurrent_streams_per_region(),
        }
    }
}

fn d_region() -> String {
    "us-east-1".into()
}
fn d_connect_timeout_secs() -> u64 {
    300
}
fn d_max_concurrent_streams_server() -> u32 {
    20
}
fn d_max_concurrent_streams_per_region() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = ModelServiceConfig::default();
        assert_eq!(cfg.region, "us-east-1");
        assert_eq!(cfg.connect_timeout_secs, 300);
        assert_eq!(cfg.max_concurrent_streams_server, 20);
        assert_eq!(cfg.max_concurrent_streams_per_region, 10);
        assert!(cfg.knowledge_base_id.is_none());
        assert!(cfg.model_arn.is_none());
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: ModelServiceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.region, "us-east-1");
    }
}
