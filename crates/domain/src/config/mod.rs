mod model_service;
mod observability;
mod server;
mod session_defaults;
mod sweeper;

pub use model_service::*;
pub use observability::*;
pub use server::*;
pub use session_defaults::*;
pub use sweeper::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model_service: ModelServiceConfig,
    #[serde(default)]
    pub session_defaults: SessionDefaultsConfig,
    #[serde(default)]
    pub sweeper: SweeperConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the process environment. Unset variables
    /// fall back to the per-struct `d_xxx()` defaults.
    pub fn from_env() -> crate::error::Result<Self> {
        let mut cfg = Config::default();

        if let Ok(port) = std::env::var("PORT") {
            cfg.server.port = port
                .parse()
                .map_err(|_| crate::error::Error::configuration(format!("PORT is not a valid u16: {port}")))?;
        }
        if let Ok(host) = std::env::var("HOST") {
            cfg.server.host = host;
        }

        if let Ok(region) = std::env::var("SG_REGION") {
            cfg.model_service.region = region;
        }
        if let Ok(kb) = std::env::var("SG_KB_ID") {
            cfg.model_service.knowledge_base_id = Some(kb);
        }
        if let Ok(arn) = std::env::var("SG_MODEL_ARN") {
            cfg.model_service.model_arn = Some(arn);
        }

        if let Ok(log_level) = std::env::var("RUST_LOG") {
            cfg.observability.log_level = log_level;
        }

        cfg.validate().into_iter().find(|e| e.severity == ConfigSeverity::Error).map_or(Ok(()), |e| {
            Err(crate::error::Error::configuration(e.to_string()))
        })?;

        Ok(cfg)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        if self.model_service.region.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "model_service.region".into(),
                message: "region must not be empty".into(),
            });
        }

        if self.model_service.connect_timeout_secs == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "model_service.connect_timeout_secs".into(),
                message: "connect_timeout_secs must be greater than 0".into(),
            });
        }

        if self.model_service.max_concurrent_streams_server == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "model_service.max_concurrent_streams_server".into(),
                message: "max_concurrent_streams_server must be greater than 0".into(),
            });
        }

        if self.sweeper.period_secs == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "sweeper.period_secs".into(),
                message: "period_secs must be greater than 0".into(),
            });
        }

        if let Some(tools) = &self.session_defaults.enabled_tools {
            if tools.is_empty() {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Warning,
                    field: "session_defaults.enabled_tools".into(),
                    message: "enabled_tools is an empty list — no tools will be usable; omit the field to enable all tools".into(),
                });
            }
        }

        if self.server.cors.allowed_origins.len() == 1 && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "server.cors.allowed_origins".into(),
                message: "wildcard \"*\" allows all origins (not recommended for production)".into(),
            });
        }

        errors
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn find_issue<'a>(issues: &'a [ConfigError], field_prefix: &str) -> Option<&'a ConfigError> {
        issues.iter().find(|e| e.field.starts_with(field_prefix))
    }

    #[test]
    fn default_config_passes_validation() {
        let issues = Config::default().validate();
        let errors: Vec<_> = issues.iter().filter(|e| e.severity == ConfigSeverity::Error).collect();
        assert!(errors.is_empty(), "expected no errors, got: {errors:?}");
    }

    #[test]
    fn server_port_zero_is_error() {
        let mut cfg = Config::default();
        cfg.server.port = 0;
        let issues = cfg.validate();
        let issue = find_issue(&issues, "server.port").expect("expected server.port error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn empty_region_is_error() {
        let mut cfg = Config::default();
        cfg.model_service.region = String::new();
        let issues = cfg.validate();
        let issue = find_issue(&issues, "model_service.region").expect("expected region error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn empty_enabled_tools_is_warning() {
        let mut cfg = Config::default();
        cfg.session_defaults.enabled_tools = Some(vec![]);
        let issues = cfg.validate();
        let issue = find_issue(&issues, "session_defaults.enabled_tools")
            .expect("expected enabled_tools warning");
        assert_eq!(issue.severity, ConfigSeverity::Warning);
    }

    #[test]
    fn cors_wildcard_is_warning() {
        let mut cfg = Config::default();
        cfg.server.cors.allowed_origins = vec!["*".into()];
        let issues = cfg.validate();
        let issue = find_issue(&issues, "server.cors.allowed_origins")
            .expect("expected CORS wildcard warning");
        assert_eq!(issue.severity, ConfigSeverity::Warning);
    }

    #[test]
    fn deserialize_empty_object_uses_all_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.model_service.region, "us-east-1");
        assert_eq!(cfg.session_defaults.output_sample_rate, 24_000);
        assert_eq!(cfg.sweeper.period_secs, 60);
        assert!(cfg.observability.json);
    }

    #[test]
    fn config_error_display_format() {
        let err = ConfigError {
            severity: ConfigSeverity::Error,
            field: "server.port".into(),
            message: "port must be greater than 0".into(),
        };
        assert_eq!(format!("{err}"), "[ERROR] server.port: port must be greater than 0");
    }
}
