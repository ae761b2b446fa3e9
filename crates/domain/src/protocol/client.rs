use serde::{Deserialize, Serialize};

use crate::config::{InferenceConfig, TurnDetectionConfig};

/// Messages the client (browser or telephony adaptor) sends over its
/// WebSocket connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "initializeConnection", rename_all = "camelCase")]
    InitializeConnection {
        #[serde(default)]
        region: Option<String>,
        #[serde(default)]
        inference_config: Option<InferenceConfig>,
        #[serde(default)]
        turn_detection_config: Option<TurnDetectionConfig>,
        #[serde(default)]
        enabled_tools: Option<Vec<String>>,
    },

    #[serde(rename = "promptStart", rename_all = "camelCase")]
    PromptStart {
        voice_id: String,
        #[serde(default)]
        output_sample_rate: Option<u32>,
    },

    #[serde(rename = "systemPrompt", rename_all = "camelCase")]
    SystemPrompt {
        content: String,
        #[serde(default)]
        voice_id: Option<String>,
    },

    #[serde(rename = "audioStart")]
    AudioStart,

    /// Base64-encoded PCM16 little-endian mono audio, or raw bytes depending
    /// on transport framing (text frame carries base64, binary frame carries
    /// raw PCM16 and is base64-encoded internally before being treated the
    /// same way).
    #[serde(rename = "audioInput")]
    AudioInput { content: String },

    #[serde(rename = "textInput")]
    TextInput { content: String },

    /// Begins graceful shutdown of the session's duplex stream.
    #[serde(rename = "stopAudio")]
    StopAudio,

    /// Terminates any existing session for this socket and re-creates it.
    #[serde(rename = "startNewChat", rename_all = "camelCase")]
    StartNewChat {
        #[serde(default)]
        region: Option<String>,
        #[serde(default)]
        inference_config: Option<InferenceConfig>,
        #[serde(default)]
        turn_detection_config: Option<TurnDetectionConfig>,
        #[serde(default)]
        enabled_tools: Option<Vec<String>>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_initialize_connection() {
        let json = r#"{"type":"initializeConnection","region":"us-east-1","enabledTools":["search_knowledge_base"]}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::InitializeConnection { region, enabled_tools, .. } => {
                assert_eq!(region.as_deref(), Some("us-east-1"));
                assert_eq!(enabled_tools, Some(vec!["search_knowledge_base".to_string()]));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn parses_audio_start_with_no_payload() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"audioStart"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::AudioStart));
    }

    #[test]
    fn parses_text_input() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"textInput","content":"hello"}"#).unwrap();
        match msg {
            ClientMessage::TextInput { content } => assert_eq!(content, "hello"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_fails_to_parse() {
        let result: Result<ClientMessage, _> = serde_json::from_str(r#"{"type":"doTheThing"}"#);
        assert!(result.is_err());
    }
}
