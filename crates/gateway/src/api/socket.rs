//! Gateway session multiplexer (C8): owns one client socket for its
//! entire lifetime, translating `ClientMessage`s into `Session`
//! transitions and relaying `GatewayEvent`s back out.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use sg_domain::config::{InferenceConfig, SessionDefaultsConfig, TurnDetectionConfig};
use sg_domain::error::Error;
use sg_domain::protocol::{ClientMessage, GatewayEvent, ToolChoice};
use sg_sessions::Session;

use crate::state::AppState;

/// Sample rate the gateway asks the model service to expect for mic
/// input; the client protocol doesn't negotiate this separately from
/// `promptStart`'s output rate, so it's fixed.
const AUDIO_INPUT_SAMPLE_RATE_HZ: u32 = 16_000;

const STOP_AUDIO_TIMEOUT: Duration = Duration::from_secs(5);
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(3);

pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Accumulates `initializeConnection`/`startNewChat` fields until
/// `promptStart` arrives, since [`Session::setup_session_and_prompt_start`]
/// needs both in one call.
struct PendingInit {
    inference_config: InferenceConfig,
    turn_detection_config: Option<TurnDetectionConfig>,
    enabled_tools: Option<Vec<String>>,
}

impl PendingInit {
    fn from_defaults(defaults: &SessionDefaultsConfig) -> Self {
        Self {
            inference_config: defaults.inference.clone(),
            turn_detection_config: defaults.turn_detection.clone(),
            enabled_tools: defaults.enabled_tools.clone(),
        }
    }

    fn apply(
        &mut self,
        inference_config: Option<InferenceConfig>,
        turn_detection_config: Option<TurnDetectionConfig>,
        enabled_tools: Option<Vec<String>>,
    ) {
        if let Some(cfg) = inference_config {
            self.inference_config = cfg;
        }
        if turn_detection_config.is_some() {
            self.turn_detection_config = turn_detection_config;
        }
        if enabled_tools.is_some() {
            self.enabled_tools = enabled_tools;
        }
    }
}

async fn new_session(state: &AppState, client_sink: mpsc::Sender<GatewayEvent>) -> Arc<Session> {
    let session = Session::new(Uuid::new_v4().to_string(), client_sink);
    state.sessions.insert(session.clone()).await;
    session
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    state.socket_connected();
    let (mut ws_sink, mut ws_stream) = socket.split();

    let (client_tx, mut client_rx) = mpsc::channel::<GatewayEvent>(64);
    let writer = tokio::spawn(async move {
        while let Some(event) = client_rx.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };
            if ws_sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let mut session = new_session(&state, client_tx.clone()).await;
    let mut pending = PendingInit::from_defaults(&state.config.session_defaults);

    loop {
        let msg = tokio::select! {
            msg = ws_stream.next() => msg,
            _ = session.close.wait() => break,
        };
        let Some(msg) = msg else { break };
        let Ok(msg) = msg else { break };

        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) | Message::Binary(_) => continue,
        };

        let client_msg: ClientMessage = match serde_json::from_str(&text) {
            Ok(msg) => msg,
            Err(error) => {
                tracing::warn!(session_id = %session.id, %error, "malformed client message");
                continue;
            }
        };

        route_client_message(&state, &mut session, &mut pending, client_msg).await;
    }

    if session.close.is_closed() {
        // closed elsewhere (inactivity sweep or process shutdown)
        let _ = session.client_sink.send(GatewayEvent::SessionClosed).await;
    } else {
        graceful_close(&session, DISCONNECT_TIMEOUT).await;
    }
    state.sessions.remove(&session.id).await;
    writer.abort();
    state.socket_disconnected();
}

async fn route_client_message(
    state: &AppState,
    session: &mut Arc<Session>,
    pending: &mut PendingInit,
    message: ClientMessage,
) {
    match message {
        ClientMessage::InitializeConnection {
            region: _,
            inference_config,
            turn_detection_config,
            enabled_tools,
        } => {
            pending.apply(inference_config, turn_detection_config, enabled_tools);
            let _ = session
                .client_sink
                .send(GatewayEvent::InitializeConnectionAck {
                    success: true,
                    error: None,
                })
                .await;
        }

        ClientMessage::PromptStart {
            voice_id,
            output_sample_rate,
        } => {
            if let Err(error) = session
                .setup_session_and_prompt_start(
                    voice_id,
                    output_sample_rate,
                    pending.inference_config.clone(),
                    pending.turn_detection_config.clone(),
                    ToolChoice::default(),
                    pending.enabled_tools.clone(),
                    &state.tool_registry,
                )
                .await
            {
                relay_error(session, "promptStart", error).await;
            }
        }

        ClientMessage::SystemPrompt { content, .. } => {
            if let Err(error) = session.setup_system_prompt(content).await {
                relay_error(session, "systemPrompt", error).await;
            }
        }

        ClientMessage::AudioStart => {
            if let Err(error) = session.setup_start_audio(AUDIO_INPUT_SAMPLE_RATE_HZ).await {
                relay_error(session, "audioStart", error).await;
                return;
            }
            if let Err(error) = session
                .initiate_streaming(state.model_client.clone(), state.tool_registry.clone())
                .await
            {
                relay_error(session, "audioStart", error).await;
                return;
            }
            let _ = session.client_sink.send(GatewayEvent::AudioReady).await;
        }

        ClientMessage::AudioInput { content } => {
            session.pending_audio.push(content);
        }

        ClientMessage::TextInput { content } => {
            if let Err(error) = session
                .send_text_input(content, state.model_client.clone(), state.tool_registry.clone())
                .await
            {
                relay_error(session, "textInput", error).await;
            }
        }

        ClientMessage::StopAudio => {
            graceful_close(session, STOP_AUDIO_TIMEOUT).await;
            state.sessions.remove(&session.id).await;
        }

        ClientMessage::StartNewChat {
            region: _,
            inference_config,
            turn_detection_config,
            enabled_tools,
        } => {
            if !session.close.is_closed() {
                graceful_close(session, STOP_AUDIO_TIMEOUT).await;
                state.sessions.remove(&session.id).await;
            }

            *pending = PendingInit::from_defaults(&state.config.session_defaults);
            pending.apply(inference_config, turn_detection_config, enabled_tools);
            *session = new_session(state, session.client_sink.clone()).await;
        }
    }
}

/// `endAudioContent → endPrompt → sendSessionEnd`, bounded by `deadline`;
/// falls back to an immediate force-close on timeout, and always tells
/// the client so it can proceed to renewal (§4.9).
async fn graceful_close(session: &Session, deadline: Duration) {
    let finished = tokio::time::timeout(deadline, async {
        session.end_audio_content().await;
        session.end_prompt().await;
        session.send_session_end().await;
    })
    .await;

    if finished.is_err() {
        session.force_close("graceful shutdown timed out").await;
    }

    let _ = session.client_sink.send(GatewayEvent::SessionClosed).await;
}

async fn relay_error(session: &Session, source: &str, error: Error) {
    tracing::warn!(session_id = %session.id, source, %error, "client message rejected");
    let _ = session
        .client_sink
        .send(GatewayEvent::Error {
            message: error.to_string(),
            details: None,
            source: Some(source.to_string()),
            kind: Some(error.kind().to_string()),
        })
        .await;
}
