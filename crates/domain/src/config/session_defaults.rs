use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Per-session defaults
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Inference knobs forwarded to the model service's `sessionStart` event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InferenceConfig {
    #[serde(default = "d_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "d_top_p")]
    pub top_p: f32,
    #[serde(default = "d_temperature")]
    pub temperature: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_tokens: d_max_tokens(),
            top_p: d_top_p(),
            temperature: d_temperature(),
        }
    }
}

fn d_max_tokens() -> u32 {
    1024
}
fn d_top_p() -> f32 {
    0.9
}
fn d_temperature() -> f32 {
    0.7
}

/// Sensitivity of the model's end-of-utterance detection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum EndpointingSensitivity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurnDetectionConfig {
    #[serde(default = "d_endpointing_sensitivity")]
    pub endpointing_sensitivity: EndpointingSensitivity,
}

impl Default for TurnDetectionConfig {
    fn default() -> Self {
        Self {
            endpointing_sensitivity: d_endpointing_sensitivity(),
        }
    }
}

fn d_endpointing_sensitivity() -> EndpointingSensitivity {
    EndpointingSensitivity::Medium
}

/// Defaults applied to a session unless the client overrides them in
/// `initializeConnection`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDefaultsConfig {
    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default = "d_turn_detection")]
    pub turn_detection: Option<TurnDetectionConfig>,

    #[serde(default = "d_output_sample_rate")]
    pub output_sample_rate: u32,

    /// `None` means all registered tools are enabled.
    #[serde(default)]
    pub enabled_tools: Option<Vec<String>>,
}

impl Default for SessionDefaultsConfig {
    fn default() -> Self {
        Self {
            inference: InferenceConfig::default(),
            turn_detection: d_turn_detection(),
            output_sample_rate: d_output_sample_rate(),
            enabled_tools: None,
        }
    }
}

fn d_turn_detection() -> Option<TurnDetectionConfig> {
    Some(TurnDetectionConfig::default())
}
fn d_output_sample_rate() -> u32 {
    24_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_defaults_match_spec() {
        let cfg = InferenceConfig::default();
        assert_eq!(cfg.max_tokens, 1024);
        assert!((cfg.top_p - 0.9).abs() < f32::EPSILON);
        assert!((cfg.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn turn_detection_defaults_to_medium() {
        let cfg = SessionDefaultsConfig::default();
        assert_eq!(
            cfg.turn_detection.unwrap().endpointing_sensitivity,
            EndpointingSensitivity::Medium
        );
    }

    #[test]
    fn output_sample_rate_defaults_to_24k() {
        assert_eq!(SessionDefaultsConfig::default().output_sample_rate, 24_000);
    }

    #[test]
    fn enabled_tools_defaults_to_none_meaning_all() {
        assert!(SessionDefaultsConfig::default().enabled_tools.is_none());
    }

    #[test]
    fn endpointing_sensitivity_serializes_uppercase() {
        let json = serde_json::to_string(&EndpointingSensitivity::High).unwrap();
        assert_eq!(json, "\"HIGH\"");
    }
}
