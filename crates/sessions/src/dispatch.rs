//! Tool dispatcher (C6) and tool-result emission (§4.7).

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use uuid::Uuid;

use sg_domain::protocol::event::GatewayEvent;
use sg_domain::protocol::wire::{
    ContentKind, ContentRole, ToolResultInputConfiguration, UpstreamEvent,
};
use sg_domain::tool::{ToolContext, ToolRegistry};
use sg_domain::trace::TraceEvent;

use crate::session::{ActiveToolContext, Session, SessionState};

const MAX_RESULT_LEN: usize = 20_480;
const TRUNCATED_SUFFIX: &str = "... (truncated)";

/// Resolves and runs a tool in a detached task so the downstream demux
/// loop is never blocked. Safe to call even after the session has
/// started closing: the local `toolResult` event is always dispatched,
/// upstream emission is skipped if the session is no longer `Active`.
pub fn dispatch_tool_use(session: Arc<Session>, registry: Arc<ToolRegistry>, ctx: ActiveToolContext) {
    tokio::spawn(async move {
        TraceEvent::ToolDispatched {
            session_id: session.id.clone(),
            tool_use_id: ctx.tool_use_id.clone(),
            tool_name: ctx.tool_name.clone(),
        }
        .emit();

        let params = parse_params(&ctx.content);
        let tool_context = ToolContext {
            session_id: session.id.clone(),
            inference_config: session.inference_config().await,
        };

        let started = Instant::now();
        let outcome = registry.execute(&ctx.tool_name, params, &tool_context).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let (result, is_error) = match outcome {
            Ok(Ok(value)) => (value, false),
            Ok(Err(failure)) => (
                serde_json::json!({"error": true, "message": failure.message}),
                true,
            ),
            // §4.6 step 1: a missing tool is a business failure, same
            // shape as one the tool itself would have returned.
            Err(error) if error.is_unknown_tool() => (
                serde_json::json!({"error": true, "message": "Tool not supported"}),
                true,
            ),
            Err(error) => (
                serde_json::json!({"error": true, "message": error.to_string()}),
                true,
            ),
        };

        TraceEvent::ToolCompleted {
            session_id: session.id.clone(),
            tool_use_id: ctx.tool_use_id.clone(),
            tool_name: ctx.tool_name.clone(),
            duration_ms,
            is_error,
        }
        .emit();

        if session.state().await == SessionState::Active {
            emit_tool_result_upstream(&session, &ctx.tool_use_id, &result).await;
        }

        let _ = session
            .client_sink
            .send(GatewayEvent::ToolResult {
                tool_use_id: ctx.tool_use_id,
                result,
                execution_time_ms: duration_ms,
                error: is_error,
            })
            .await;
    });
}

fn parse_params(content: &str) -> Value {
    serde_json::from_str(content).unwrap_or_else(|_| serde_json::json!({"content": content}))
}

/// Sanitizes and length-caps a tool result before it's embedded in a
/// `toolResult` upstream event (§4.7 step 3).
pub fn sanitize_and_truncate(raw: &str) -> String {
    let sanitized: String = raw
        .chars()
        .filter(|c| {
            let code = *c as u32;
            code > 0x1F || matches!(*c, '\t' | '\n' | '\r')
        })
        .collect();

    if sanitized.chars().count() <= MAX_RESULT_LEN {
        return sanitized;
    }

    let truncated: String = sanitized.chars().take(MAX_RESULT_LEN).collect();
    format!("{truncated}{TRUNCATED_SUFFIX}")
}

async fn emit_tool_result_upstream(session: &Arc<Session>, tool_use_id: &str, result: &Value) {
    let content_name = Uuid::new_v4().to_string();
    let raw = result.to_string();
    let content = sanitize_and_truncate(&raw);

    session.upstream.enqueue(UpstreamEvent::ContentStart {
        prompt_name: session.prompt_name.clone(),
        content_name: content_name.clone(),
        kind: ContentKind::Tool,
        role: ContentRole::Tool,
        interactive: Some(false),
        text_input_configuration: None,
        audio_input_configuration: None,
        tool_result_input_configuration: Some(ToolResultInputConfiguration {
            tool_use_id: tool_use_id.to_string(),
        }),
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    session.upstream.enqueue(UpstreamEvent::ToolResult {
        prompt_name: session.prompt_name.clone(),
        content_name: content_name.clone(),
        content,
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    session.upstream.enqueue(UpstreamEvent::ContentEnd {
        prompt_name: session.prompt_name.clone(),
        content_name,
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_string_content() {
        let value = parse_params(r#"{"query":"borewell pump"}"#);
        assert_eq!(value["query"], "borewell pump");
    }

    #[test]
    fn falls_back_to_raw_content_wrapper_on_parse_failure() {
        let value = parse_params("not json");
        assert_eq!(value["content"], "not json");
    }

    #[test]
    fn sanitize_strips_control_characters_but_keeps_whitespace() {
        let raw = "line one\x00\x07\nline two\t\r";
        let cleaned = sanitize_and_truncate(raw);
        assert_eq!(cleaned, "line one\nline two\t\r");
    }

    #[test]
    fn sanitize_truncates_and_appends_suffix() {
        let raw = "a".repeat(MAX_RESULT_LEN + 100);
        let cleaned = sanitize_and_truncate(&raw);
        assert!(cleaned.ends_with(TRUNCATED_SUFFIX));
        assert_eq!(cleaned.len(), MAX_RESULT_LEN + TRUNCATED_SUFFIX.len());
    }

    #[test]
    fn sanitize_leaves_short_result_unchanged() {
        let raw = r#"{"answer":"ok"}"#;
        assert_eq!(sanitize_and_truncate(raw), raw);
    }
}
