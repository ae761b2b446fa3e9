//! Session state machine (C5): states {Closed, Initializing, Ready,
//! Active, Closing}; sequences protocol events; enforces lifecycle
//! invariants from §3/§4.4.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use sg_domain::config::{InferenceConfig, TurnDetectionConfig};
use sg_domain::error::{Error, Result};
use sg_domain::protocol::event::GatewayEvent;
use sg_domain::protocol::wire::{
    AudioInputConfiguration, AudioOutputConfiguration, ContentKind, ContentRole,
    InferenceConfiguration, TextInputConfiguration, ToolChoice, ToolConfiguration,
    ToolInputSchema, ToolSpecEntry, ToolSpecInner, ToolUseOutputConfiguration,
    TextOutputConfiguration, TurnDetectionConfiguration, UpstreamEvent,
};
use sg_domain::tool::ToolRegistry;
use sg_domain::trace::TraceEvent;

use sg_modelclient::ModelServiceConnection;

use crate::close::CloseSignal;
use crate::audio::PendingAudioQueue;
use crate::queue::UpstreamQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Initializing,
    Ready,
    Active,
    Closing,
}

impl SessionState {
    fn as_str(self) -> &'static str {
        match self {
            SessionState::Closed => "closed",
            SessionState::Initializing => "initializing",
            SessionState::Ready => "ready",
            SessionState::Active => "active",
            SessionState::Closing => "closing",
        }
    }
}

/// The most recently observed `toolUse` event, cached until its closing
/// `contentEnd(type=TOOL)` marker arrives.
#[derive(Debug, Clone)]
pub struct ActiveToolContext {
    pub tool_use_id: String,
    pub tool_name: String,
    pub content: String,
}

#[derive(Default)]
struct SessionFlags {
    prompt_start_sent: bool,
    audio_content_start_sent: bool,
    cleanup_in_progress: bool,
}

struct SessionInner {
    state: SessionState,
    inference_config: InferenceConfig,
    turn_detection_config: Option<TurnDetectionConfig>,
    tool_choice: ToolChoice,
    enabled_tools: Option<Vec<String>>,
    voice_id: String,
    output_sample_rate: u32,
    active_tool_context: Option<ActiveToolContext>,
    flags: SessionFlags,
}

/// Owns exactly one client socket's voice session. Mutations are
/// single-writer: serialized through `inner`'s mutex, which every
/// transition method holds for its whole (possibly `.await`-ing)
/// duration so two transitions never interleave.
pub struct Session {
    pub id: String,
    pub prompt_name: String,
    pub audio_content_id: String,
    pub close: CloseSignal,
    pub upstream: UpstreamQueue,
    pub pending_audio: PendingAudioQueue,
    pub client_sink: mpsc::Sender<GatewayEvent>,
    last_activity: Mutex<DateTime<Utc>>,
    inner: Mutex<SessionInner>,
}

impl Session {
    pub fn new(id: impl Into<String>, client_sink: mpsc::Sender<GatewayEvent>) -> Arc<Self> {
        let id = id.into();
        let close = CloseSignal::new();
        let prompt_name = Uuid::new_v4().to_string();
        let audio_content_id = Uuid::new_v4().to_string();

        TraceEvent::SessionCreated {
            session_id: id.clone(),
            prompt_name: prompt_name.clone(),
        }
        .emit();

        Arc::new(Self {
            id,
            prompt_name,
            audio_content_id,
            upstream: UpstreamQueue::new(close.clone()),
            pending_audio: PendingAudioQueue::new(),
            client_sink,
            close,
            last_activity: Mutex::new(Utc::now()),
            inner: Mutex::new(SessionInner {
                state: SessionState::Initializing,
                inference_config: InferenceConfig::default(),
                turn_detection_config: None,
                tool_choice: ToolChoice::default(),
                enabled_tools: None,
                voice_id: String::new(),
                output_sample_rate: 24_000,
                active_tool_context: None,
                flags: SessionFlags::default(),
            }),
        })
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    pub async fn touch_activity(&self) {
        *self.last_activity.lock().await = Utc::now();
    }

    pub async fn idle_for(&self) -> chrono::Duration {
        Utc::now() - *self.last_activity.lock().await
    }

    async fn transition(&self, inner: &mut SessionInner, to: SessionState) {
        if inner.state != to {
            TraceEvent::SessionStateChanged {
                session_id: self.id.clone(),
                from: inner.state.as_str(),
                to: to.as_str(),
            }
            .emit();
            inner.state = to;
        }
    }

    /// `createSession` is [`Session::new`]; this is
    /// `setupSessionAndPromptStart`.
    pub async fn setup_session_and_prompt_start(
        &self,
        voice_id: String,
        output_sample_rate: Option<u32>,
        inference_config: InferenceConfig,
        turn_detection_config: Option<TurnDetectionConfig>,
        tool_choice: ToolChoice,
        enabled_tools: Option<Vec<String>>,
        registry: &ToolRegistry,
    ) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.state != SessionState::Initializing {
            return Err(Error::session_lifecycle(format!(
                "setupSessionAndPromptStart called in state {:?}",
                inner.state
            )));
        }

        inner.voice_id = voice_id.clone();
        inner.output_sample_rate = output_sample_rate.unwrap_or(inner.output_sample_rate);
        inner.inference_config = inference_config;
        inner.turn_detection_config = turn_detection_config.clone();
        inner.tool_choice = tool_choice.clone();
        inner.enabled_tools = enabled_tools.clone();

        self.upstream.enqueue(UpstreamEvent::SessionStart {
            inference_configuration: InferenceConfiguration::from(&inner.inference_config),
            turn_detection_configuration: turn_detection_config
                .map(|t| TurnDetectionConfiguration {
                    endpointing_sensitivity: t.endpointing_sensitivity,
                }),
        });

        let tools = registry
            .specs(enabled_tools.as_deref())
            .into_iter()
            .map(|spec| ToolSpecEntry {
                tool_spec: ToolSpecInner {
                    name: spec.name,
                    description: spec.description,
                    input_schema: ToolInputSchema { json: spec.schema },
                },
            })
            .collect();

        self.upstream.enqueue(UpstreamEvent::PromptStart {
            prompt_name: self.prompt_name.clone(),
            text_output_configuration: TextOutputConfiguration::default(),
            audio_output_configuration: AudioOutputConfiguration {
                media_type: "audio/lpcm".into(),
                sample_rate_hertz: inner.output_sample_rate,
                sample_size_bits: 16,
                channel_count: 1,
                voice_id,
            },
            tool_use_output_configuration: ToolUseOutputConfiguration::default(),
            tool_configuration: ToolConfiguration {
                tools,
                tool_choice,
            },
        });

        inner.flags.prompt_start_sent = true;
        drop(inner);
        self.touch_activity().await;
        Ok(())
    }

    pub async fn setup_system_prompt(&self, content: String) -> Result<()> {
        if content.trim().is_empty() {
            return Err(Error::configuration("system prompt must not be empty"));
        }

        let inner = self.inner.lock().await;
        if inner.state != SessionState::Initializing {
            return Err(Error::session_lifecycle(format!(
                "setupSystemPrompt called in state {:?}",
                inner.state
            )));
        }
        drop(inner);

        let content_name = Uuid::new_v4().to_string();
        self.upstream.enqueue(UpstreamEvent::ContentStart {
            prompt_name: self.prompt_name.clone(),
            content_name: content_name.clone(),
            kind: ContentKind::System,
            role: ContentRole::System,
            interactive: None,
            text_input_configuration: Some(TextInputConfiguration::default()),
            audio_input_configuration: None,
            tool_result_input_configuration: None,
        });
        self.upstream.enqueue(UpstreamEvent::TextInput {
            prompt_name: self.prompt_name.clone(),
            content_name: content_name.clone(),
            content,
        });
        self.upstream.enqueue(UpstreamEvent::ContentEnd {
            prompt_name: self.prompt_name.clone(),
            content_name,
        });

        self.touch_activity().await;
        Ok(())
    }

    pub async fn setup_start_audio(&self, sample_rate_hertz: u32) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.flags.prompt_start_sent {
            return Err(Error::protocol("setupStartAudio before promptStart"));
        }

        self.upstream.enqueue(UpstreamEvent::ContentStart {
            prompt_name: self.prompt_name.clone(),
            content_name: self.audio_content_id.clone(),
            kind: ContentKind::User,
            role: ContentRole::User,
            interactive: Some(true),
            text_input_configuration: None,
            audio_input_configuration: Some(AudioInputConfiguration {
                media_type: "audio/lpcm".into(),
                sample_rate_hertz,
                sample_size_bits: 16,
                channel_count: 1,
            }),
            tool_result_input_configuration: None,
        });
        inner.flags.audio_content_start_sent = true;
        self.transition(&mut inner, SessionState::Ready).await;
        drop(inner);
        self.touch_activity().await;
        Ok(())
    }

    /// Opens the duplex stream to the model service, binds the upstream
    /// iterator, and spawns the downstream demux loop.
    pub async fn initiate_streaming(
        self: &Arc<Self>,
        model_client: Arc<dyn ModelServiceConnection>,
        registry: Arc<ToolRegistry>,
    ) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.state != SessionState::Ready {
            return Err(Error::session_lifecycle(format!(
                "initiateStreaming called in state {:?}",
                inner.state
            )));
        }

        let upstream_body = crate::queue::upstream_byte_stream(self.clone());
        let downstream = model_client.connect(&self.id, upstream_body).await?;

        TraceEvent::ModelServiceConnected {
            session_id: self.id.clone(),
            region: String::new(),
        }
        .emit();

        tokio::spawn(crate::demux::run(self.clone(), downstream, registry));
        tokio::spawn(crate::audio::run(self.clone()));

        self.transition(&mut inner, SessionState::Active).await;
        Ok(())
    }

    pub async fn stream_audio(&self, base64_pcm16: String) -> Result<()> {
        let inner = self.inner.lock().await;
        if inner.state != SessionState::Active {
            return Err(Error::protocol("streamAudio before the session is active"));
        }
        drop(inner);

        self.upstream.enqueue(UpstreamEvent::AudioInput {
            prompt_name: self.prompt_name.clone(),
            content_name: self.audio_content_id.clone(),
            content: base64_pcm16,
        });
        self.touch_activity().await;
        Ok(())
    }

    /// Lazily promotes `Ready` to `Active` the first time text input
    /// arrives, per §4.4's tie-break policy.
    pub async fn send_text_input(
        self: &Arc<Self>,
        content: String,
        model_client: Arc<dyn ModelServiceConnection>,
        registry: Arc<ToolRegistry>,
    ) -> Result<()> {
        if self.state().await == SessionState::Ready {
            self.initiate_streaming(model_client, registry).await?;
        }

        let inner = self.inner.lock().await;
        if inner.state != SessionState::Active {
            return Err(Error::session_lifecycle(format!(
                "sendTextInput called in state {:?}",
                inner.state
            )));
        }
        drop(inner);

        let content_name = Uuid::new_v4().to_string();
        self.upstream.enqueue(UpstreamEvent::ContentStart {
            prompt_name: self.prompt_name.clone(),
            content_name: content_name.clone(),
            kind: ContentKind::User,
            role: ContentRole::User,
            interactive: Some(true),
            text_input_configuration: Some(TextInputConfiguration::default()),
            audio_input_configuration: None,
            tool_result_input_configuration: None,
        });
        self.upstream.enqueue(UpstreamEvent::TextInput {
            prompt_name: self.prompt_name.clone(),
            content_name: content_name.clone(),
            content,
        });
        self.upstream.enqueue(UpstreamEvent::ContentEnd {
            prompt_name: self.prompt_name.clone(),
            content_name,
        });
        self.touch_activity().await;
        Ok(())
    }

    pub async fn end_audio_content(&self) {
        let audio_sent = self.inner.lock().await.flags.audio_content_start_sent;
        if !audio_sent {
            return;
        }
        self.upstream.enqueue(UpstreamEvent::ContentEnd {
            prompt_name: self.prompt_name.clone(),
            content_name: self.audio_content_id.clone(),
        });
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    pub async fn end_prompt(&self) {
        let prompt_sent = self.inner.lock().await.flags.prompt_start_sent;
        if !prompt_sent {
            return;
        }
        self.upstream.enqueue(UpstreamEvent::PromptEnd {
            prompt_name: self.prompt_name.clone(),
        });
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    /// Graceful close: `endAudioContent → endPrompt → sendSessionEnd`,
    /// guarded against re-entry by `cleanupInProgress`.
    pub async fn send_session_end(&self) {
        {
            let mut inner = self.inner.lock().await;
            if inner.flags.cleanup_in_progress {
                return;
            }
            inner.flags.cleanup_in_progress = true;
            self.transition(&mut inner, SessionState::Closing).await;
        }

        self.upstream.enqueue(UpstreamEvent::SessionEnd {});
        tokio::time::sleep(Duration::from_millis(300)).await;
        self.close.fire();

        TraceEvent::SessionClosed {
            session_id: self.id.clone(),
            forced: false,
            reason: "sendSessionEnd".into(),
        }
        .emit();
    }

    /// Immediate, idempotent close with no upstream emission.
    pub async fn force_close(&self, reason: &str) {
        let mut inner = self.inner.lock().await;
        if inner.flags.cleanup_in_progress {
            return;
        }
        inner.flags.cleanup_in_progress = true;
        self.transition(&mut inner, SessionState::Closing).await;
        drop(inner);

        self.close.fire();

        TraceEvent::SessionClosed {
            session_id: self.id.clone(),
            forced: true,
            reason: reason.into(),
        }
        .emit();
    }

    pub async fn set_active_tool_context(&self, ctx: ActiveToolContext) {
        self.inner.lock().await.active_tool_context = Some(ctx);
    }

    pub async fn take_active_tool_context(&self) -> Option<ActiveToolContext> {
        self.inner.lock().await.active_tool_context.take()
    }

    pub async fn inference_config(&self) -> InferenceConfig {
        self.inner.lock().await.inference_config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_domain::tool::ToolRegistry;

    fn sink() -> mpsc::Sender<GatewayEvent> {
        mpsc::channel(8).0
    }

    #[tokio::test]
    async fn new_session_starts_initializing() {
        let session = Session::new("s1", sink());
        assert_eq!(session.state().await, SessionState::Initializing);
    }

    #[tokio::test]
    async fn setup_start_audio_before_prompt_start_is_protocol_error() {
        let session = Session::new("s1", sink());
        let err = session.setup_start_audio(16_000).await.unwrap_err();
        assert_eq!(err.kind(), "protocol");
    }

    #[tokio::test]
    async fn full_preamble_reaches_ready() {
        let session = Session::new("s1", sink());
        let registry = ToolRegistry::new();
        session
            .setup_session_and_prompt_start(
                "kiara".into(),
                Some(24_000),
                InferenceConfig::default(),
                None,
                ToolChoice::default(),
                None,
                &registry,
            )
            .await
            .unwrap();
        session.setup_system_prompt("be helpful".into()).await.unwrap();
        session.setup_start_audio(16_000).await.unwrap();
        assert_eq!(session.state().await, SessionState::Ready);
    }

    #[tokio::test]
    async fn empty_system_prompt_is_configuration_error() {
        let session = Session::new("s1", sink());
        let err = session.setup_system_prompt("   ".into()).await.unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[tokio::test]
    async fn force_close_is_idempotent() {
        let session = Session::new("s1", sink());
        session.force_close("test").await;
        session.force_close("test").await;
        assert!(session.close.is_closed());
    }

    #[tokio::test]
    async fn stream_audio_before_active_is_protocol_error() {
        let session = Session::new("s1", sink());
        let err = session.stream_audio("AAAA".into()).await.unwrap_err();
        assert_eq!(err.kind(), "protocol");
    }
}
