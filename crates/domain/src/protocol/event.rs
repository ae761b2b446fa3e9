use serde::{Deserialize, Serialize};

/// Events the gateway relays to the client over its WebSocket. Shape
/// mirrors the downstream model-service kinds it is derived from
/// (§4.9), plus the two gateway-originated lifecycle events
/// (`audioReady`, `sessionClosed`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GatewayEvent {
    #[serde(rename = "audioReady")]
    AudioReady,

    #[serde(rename = "sessionClosed")]
    SessionClosed,

    #[serde(rename = "initializeConnectionAck", rename_all = "camelCase")]
    InitializeConnectionAck {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "contentStart", rename_all = "camelCase")]
    ContentStart {
        content_name: String,
        #[serde(default)]
        content_type: Option<String>,
        #[serde(default)]
        role: Option<String>,
    },

    #[serde(rename = "textOutput", rename_all = "camelCase")]
    TextOutput {
        content: String,
        #[serde(default)]
        role: Option<String>,
    },

    #[serde(rename = "audioOutput", rename_all = "camelCase")]
    AudioOutput { content: String },

    #[serde(rename = "contentEnd", rename_all = "camelCase")]
    ContentEnd {
        content_name: String,
        #[serde(default)]
        stop_reason: Option<String>,
    },

    #[serde(rename = "toolUse", rename_all = "camelCase")]
    ToolUse {
        tool_use_id: String,
        tool_name: String,
        content: serde_json::Value,
    },

    #[serde(rename = "toolResult", rename_all = "camelCase")]
    ToolResult {
        tool_use_id: String,
        result: serde_json::Value,
        execution_time_ms: u64,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        error: bool,
    },

    #[serde(rename = "bargeIn")]
    BargeIn { interrupted: bool },

    #[serde(rename = "streamComplete")]
    StreamComplete { timestamp: String },

    #[serde(rename = "streamInterrupted")]
    StreamInterrupted,

    #[serde(rename = "error", rename_all = "camelCase")]
    Error {
        message: String,
        #[serde(default)]
        details: Option<String>,
        #[serde(default)]
        source: Option<String>,
        #[serde(default, rename = "type")]
        kind: Option<String>,
    },

    #[serde(rename = "usageEvent")]
    UsageEvent { usage: serde_json::Value },

    #[serde(rename = "completionStart")]
    CompletionStart,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_result_omits_error_field_when_false() {
        let ev = GatewayEvent::ToolResult {
            tool_use_id: "t-1".into(),
            result: serde_json::json!({"answer": "ok"}),
            execution_time_ms: 12,
            error: false,
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn tool_result_includes_error_field_when_true() {
        let ev = GatewayEvent::ToolResult {
            tool_use_id: "t-1".into(),
            result: serde_json::json!({"error": true, "message": "upstream 503"}),
            execution_time_ms: 5,
            error: true,
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("\"error\":true"));
    }

    #[test]
    fn barge_in_serializes_with_type_tag() {
        let ev = GatewayEvent::BargeIn { interrupted: true };
        let json = serde_json::to_string(&ev).unwrap();
        assert_eq!(json, r#"{"type":"bargeIn","interrupted":true}"#);
    }

    #[test]
    fn audio_ready_has_no_payload_fields() {
        let json = serde_json::to_string(&GatewayEvent::AudioReady).unwrap();
        assert_eq!(json, r#"{"type":"audioReady"}"#);
    }

    #[test]
    fn initialize_ack_omits_error_when_successful() {
        let ev = GatewayEvent::InitializeConnectionAck {
            success: true,
            error: None,
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert_eq!(json, r#"{"type":"initializeConnectionAck","success":true}"#);
    }

    #[test]
    fn initialize_ack_includes_error_on_failure() {
        let ev = GatewayEvent::InitializeConnectionAck {
            success: false,
            error: Some("bad region".into()),
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("\"error\":\"bad region\""));
    }
}
