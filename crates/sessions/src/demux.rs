//! Downstream demultiplexer (C4): parses framed events from the model
//! service and routes them by kind.

use std::sync::Arc;

use futures_util::StreamExt;

use sg_domain::protocol::event::GatewayEvent;
use sg_domain::protocol::wire::DownstreamEvent;
use sg_domain::tool::ToolRegistry;
use sg_domain::trace::TraceEvent;
use sg_modelclient::BoxStream;

use crate::dispatch::dispatch_tool_use;
use crate::session::{ActiveToolContext, Session};

/// Runs to completion of the downstream stream (or the session's close
/// signal firing). Spawned by `Session::initiate_streaming`.
pub async fn run(
    session: Arc<Session>,
    mut downstream: BoxStream<'static, sg_domain::error::Result<sg_domain::protocol::wire::Frame<DownstreamEvent>>>,
    registry: Arc<ToolRegistry>,
) {
    let mut current_content_name: Option<String> = None;

    loop {
        let next = tokio::select! {
            frame = downstream.next() => frame,
            _ = session.close.wait() => None,
        };

        let Some(frame) = next else { break };
        session.touch_activity().await;

        let frame = match frame {
            Ok(frame) => frame,
            Err(error) => {
                TraceEvent::ModelServiceError {
                    session_id: session.id.clone(),
                    source: "responseStream".into(),
                    details: error.to_string(),
                }
                .emit();
                relay(
                    &session,
                    GatewayEvent::Error {
                        message: error.to_string(),
                        details: None,
                        source: Some("responseStream".into()),
                        kind: Some(error.kind().to_string()),
                    },
                )
                .await;
                continue;
            }
        };

        match frame.event {
            DownstreamEvent::ContentStart {
                content_name,
                r#type,
                role,
                ..
            } => {
                current_content_name = Some(content_name.clone());
                relay(
                    &session,
                    GatewayEvent::ContentStart {
                        content_name,
                        content_type: r#type,
                        role,
                    },
                )
                .await;
            }

            DownstreamEvent::TextOutput { content, role, .. } => {
                if contains_interrupted_marker(&content) {
                    TraceEvent::BargeInDetected {
                        session_id: session.id.clone(),
                    }
                    .emit();
                    relay(&session, GatewayEvent::BargeIn { interrupted: true }).await;
                }
                relay(&session, GatewayEvent::TextOutput { content, role }).await;
            }

            DownstreamEvent::AudioOutput { content } => {
                relay(&session, GatewayEvent::AudioOutput { content }).await;
            }

            DownstreamEvent::ToolUse {
                tool_use_id,
                tool_name,
                content,
            } => {
                session
                    .set_active_tool_context(ActiveToolContext {
                        tool_use_id: tool_use_id.clone(),
                        tool_name: tool_name.clone(),
                        content: content.clone(),
                    })
                    .await;
                relay(
                    &session,
                    GatewayEvent::ToolUse {
                        tool_use_id,
                        tool_name,
                        content: serde_json::Value::String(content),
                    },
                )
                .await;
            }

            DownstreamEvent::ContentEnd { r#type, stop_reason } => {
                if r#type.as_deref() == Some("TOOL") {
                    if let Some(ctx) = session.take_active_tool_context().await {
                        dispatch_tool_use(session.clone(), registry.clone(), ctx);
                    }
                }
                relay(
                    &session,
                    GatewayEvent::ContentEnd {
                        content_name: current_content_name.clone().unwrap_or_default(),
                        stop_reason: stop_reason.map(stop_reason_tag),
                    },
                )
                .await;

                if matches!(
                    stop_reason,
                    Some(sg_domain::protocol::wire::StopReason::Interrupted)
                ) {
                    relay(&session, GatewayEvent::StreamInterrupted).await;
                }
            }

            DownstreamEvent::CompletionStart => {
                relay(&session, GatewayEvent::CompletionStart).await;
            }

            DownstreamEvent::UsageEvent { usage } => {
                relay(&session, GatewayEvent::UsageEvent { usage }).await;
            }

            DownstreamEvent::ModelStreamErrorException { message } => {
                emit_transport_error(&session, "modelStreamErrorException", message).await;
            }

            DownstreamEvent::InternalServerException { message } => {
                emit_transport_error(&session, "internalServerException", message).await;
            }

            DownstreamEvent::Unknown => {
                tracing::debug!(session_id = %session.id, "unrecognized downstream event kind");
            }
        }
    }

    relay(
        &session,
        GatewayEvent::StreamComplete {
            timestamp: chrono::Utc::now().to_rfc3339(),
        },
    )
    .await;
}

fn stop_reason_tag(reason: sg_domain::protocol::wire::StopReason) -> String {
    serde_json::to_value(reason)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn contains_interrupted_marker(content: &str) -> bool {
    let stripped: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    stripped.contains(r#"{"interrupted":true}"#)
}

async fn emit_transport_error(session: &Arc<Session>, kind: &str, message: Option<String>) {
    TraceEvent::ModelServiceError {
        session_id: session.id.clone(),
        source: "responseStream".into(),
        details: message.clone().unwrap_or_default(),
    }
    .emit();
    relay(
        session,
        GatewayEvent::Error {
            message: message.unwrap_or_else(|| kind.to_string()),
            details: None,
            source: Some("responseStream".into()),
            kind: Some(kind.to_string()),
        },
    )
    .await;
}

async fn relay(session: &Arc<Session>, event: GatewayEvent) {
    let _ = session.client_sink.send(event).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_interrupted_marker_regardless_of_whitespace() {
        assert!(contains_interrupted_marker(r#"{"interrupted":true}"#));
        assert!(contains_interrupted_marker(r#"{ "interrupted" : true }"#));
        assert!(!contains_interrupted_marker("just talking"));
    }

    #[test]
    fn stop_reason_tag_matches_wire_casing() {
        assert_eq!(
            stop_reason_tag(sg_domain::protocol::wire::StopReason::ToolUse),
            "TOOL_USE"
        );
        assert_eq!(
            stop_reason_tag(sg_domain::protocol::wire::StopReason::EndTurn),
            "END_TURN"
        );
    }
}
