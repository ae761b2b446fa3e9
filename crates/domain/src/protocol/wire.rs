//! The JSON envelope exchanged with the remote model service over its
//! duplex HTTP/2 stream. Both directions use `{"event": {<kind>: <payload>}}`
//! — an externally-tagged enum serializes to exactly that shape, so
//! [`UpstreamEvent`] and [`DownstreamEvent`] need no `#[serde(tag = ...)]`.

use serde::{Deserialize, Serialize};

use crate::config::{EndpointingSensitivity, InferenceConfig};

/// Wraps a single upstream or downstream event in the `{"event": ...}`
/// envelope the model service expects on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame<E> {
    pub event: E,
}

impl<E> Frame<E> {
    pub fn new(event: E) -> Self {
        Self { event }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Upstream (gateway → model service)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfiguration {
    pub max_tokens: u32,
    pub top_p: f32,
    pub temperature: f32,
}

impl From<&InferenceConfig> for InferenceConfiguration {
    fn from(c: &InferenceConfig) -> Self {
        Self {
            max_tokens: c.max_tokens,
            top_p: c.top_p,
            temperature: c.temperature,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnDetectionConfiguration {
    pub endpointing_sensitivity: EndpointingSensitivity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOutputConfiguration {
    pub media_type: String,
}

impl Default for TextOutputConfiguration {
    fn default() -> Self {
        Self {
            media_type: "text/plain".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioOutputConfiguration {
    pub media_type: String,
    pub sample_rate_hertz: u32,
    pub sample_size_bits: u16,
    pub channel_count: u16,
    pub voice_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUseOutputConfiguration {
    pub media_type: String,
}

impl Default for ToolUseOutputConfiguration {
    fn default() -> Self {
        Self {
            media_type: "application/json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpecInner {
    pub name: String,
    pub description: String,
    pub input_schema: ToolInputSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInputSchema {
    /// The JSON Schema itself, serialized as a string (the model service
    /// expects the schema embedded as text, not a nested JSON object).
    pub json: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpecEntry {
    pub tool_spec: ToolSpecInner,
}

/// Mirrors `Session.toolChoice`: `auto`, `any`, or a specific named tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    Auto,
    Any,
    #[serde(rename_all = "camelCase")]
    Specific { tool_name: String },
}

impl Default for ToolChoice {
    fn default() -> Self {
        ToolChoice::Auto
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfiguration {
    pub tools: Vec<ToolSpecEntry>,
    pub tool_choice: ToolChoice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    System,
    User,
    Tool,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentRole {
    System,
    User,
    Tool,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInputConfiguration {
    pub media_type: String,
}

impl Default for TextInputConfiguration {
    fn default() -> Self {
        Self {
            media_type: "text/plain".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioInputConfiguration {
    pub media_type: String,
    pub sample_rate_hertz: u32,
    pub sample_size_bits: u16,
    pub channel_count: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultInputConfiguration {
    pub tool_use_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpstreamEvent {
    #[serde(rename = "sessionStart", rename_all = "camelCase")]
    SessionStart {
        inference_configuration: InferenceConfiguration,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        turn_detection_configuration: Option<TurnDetectionConfiguration>,
    },

    #[serde(rename = "promptStart", rename_all = "camelCase")]
    PromptStart {
        prompt_name: String,
        text_output_configuration: TextOutputConfiguration,
        audio_output_configuration: AudioOutputConfiguration,
        tool_use_output_configuration: ToolUseOutputConfiguration,
        tool_configuration: ToolConfiguration,
    },

    #[serde(rename = "contentStart", rename_all = "camelCase")]
    ContentStart {
        prompt_name: String,
        content_name: String,
        #[serde(rename = "type")]
        kind: ContentKind,
        role: ContentRole,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interactive: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_input_configuration: Option<TextInputConfiguration>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        audio_input_configuration: Option<AudioInputConfiguration>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_result_input_configuration: Option<ToolResultInputConfiguration>,
    },

    #[serde(rename = "textInput", rename_all = "camelCase")]
    TextInput {
        prompt_name: String,
        content_name: String,
        content: String,
    },

    #[serde(rename = "audioInput", rename_all = "camelCase")]
    AudioInput {
        prompt_name: String,
        content_name: String,
        /// Base64-encoded PCM16 samples.
        content: String,
    },

    #[serde(rename = "toolResult", rename_all = "camelCase")]
    ToolResult {
        prompt_name: String,
        content_name: String,
        /// The sanitized, length-capped JSON result, stringified.
        content: String,
    },

    #[serde(rename = "contentEnd", rename_all = "camelCase")]
    ContentEnd {
        prompt_name: String,
        content_name: String,
    },

    #[serde(rename = "promptEnd", rename_all = "camelCase")]
    PromptEnd { prompt_name: String },

    #[serde(rename = "sessionEnd")]
    SessionEnd {},
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Downstream (model service → gateway)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopReason {
    EndTurn,
    Interrupted,
    MaxTokens,
    ToolUse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DownstreamEvent {
    #[serde(rename = "contentStart", rename_all = "camelCase")]
    ContentStart {
        prompt_name: String,
        content_name: String,
        #[serde(default)]
        r#type: Option<String>,
        #[serde(default)]
        role: Option<String>,
    },

    #[serde(rename = "textOutput", rename_all = "camelCase")]
    TextOutput {
        #[serde(default)]
        role: Option<String>,
        content: String,
        #[serde(default)]
        additional_model_fields: Option<serde_json::Value>,
    },

    #[serde(rename = "audioOutput", rename_all = "camelCase")]
    AudioOutput { content: String },

    #[serde(rename = "toolUse", rename_all = "camelCase")]
    ToolUse {
        tool_use_id: String,
        tool_name: String,
        content: String,
    },

    #[serde(rename = "contentEnd", rename_all = "camelCase")]
    ContentEnd {
        #[serde(default)]
        r#type: Option<String>,
        #[serde(default)]
        stop_reason: Option<StopReason>,
    },

    #[serde(rename = "completionStart")]
    CompletionStart,

    #[serde(rename = "usageEvent")]
    UsageEvent { usage: serde_json::Value },

    #[serde(rename = "modelStreamErrorException", rename_all = "camelCase")]
    ModelStreamErrorException {
        #[serde(default)]
        message: Option<String>,
    },

    #[serde(rename = "internalServerException", rename_all = "camelCase")]
    InternalServerException {
        #[serde(default)]
        message: Option<String>,
    },

    /// Catch-all for any kind this gateway version doesn't recognize yet.
    /// Dispatched to the generic `unknown` handler per §4.3.
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_end_serializes_to_empty_object() {
        let frame = Frame::new(UpstreamEvent::SessionEnd {});
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, r#"{"event":{"sessionEnd":{}}}"#);
    }

    #[test]
    fn session_start_serializes_with_nested_kind_key() {
        let frame = Frame::new(UpstreamEvent::SessionStart {
            inference_configuration: InferenceConfiguration {
                max_tokens: 1024,
                top_p: 0.9,
                temperature: 0.7,
            },
            turn_detection_configuration: None,
        });
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.starts_with(r#"{"event":{"sessionStart":"#));
        assert!(!json.contains("turnDetectionConfiguration"));
    }

    #[test]
    fn downstream_text_output_parses() {
        let json = r#"{"textOutput":{"content":"{\"interrupted\":true}","role":"ASSISTANT"}}"#;
        let ev: DownstreamEvent = serde_json::from_str(json).unwrap();
        match ev {
            DownstreamEvent::TextOutput { content, role, .. } => {
                assert_eq!(content, r#"{"interrupted":true}"#);
                assert_eq!(role.as_deref(), Some("ASSISTANT"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn downstream_content_end_carries_stop_reason() {
        let json = r#"{"contentEnd":{"type":"TOOL","stopReason":"TOOL_USE"}}"#;
        let ev: DownstreamEvent = serde_json::from_str(json).unwrap();
        match ev {
            DownstreamEvent::ContentEnd { stop_reason, r#type } => {
                assert_eq!(stop_reason, Some(StopReason::ToolUse));
                assert_eq!(r#type.as_deref(), Some("TOOL"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn unrecognized_kind_falls_back_to_unknown() {
        let json = r#"{"somethingNew":{}}"#;
        let ev: DownstreamEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(ev, DownstreamEvent::Unknown));
    }

    #[test]
    fn tool_choice_auto_serializes_lowercase() {
        let json = serde_json::to_string(&ToolChoice::Auto).unwrap();
        assert_eq!(json, "\"auto\"");
    }
}
