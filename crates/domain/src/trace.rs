use serde::Serialize;

/// Structured trace events emitted across all voicegate crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SessionCreated {
        session_id: String,
        prompt_name: String,
    },
    SessionStateChanged {
        session_id: String,
        from: &'static str,
        to: &'static str,
    },
    SessionClosed {
        session_id: String,
        forced: bool,
        reason: String,
    },
    ToolDispatched {
        session_id: String,
        tool_use_id: String,
        tool_name: String,
    },
    ToolCompleted {
        session_id: String,
        tool_use_id: String,
        tool_name: String,
        duration_ms: u64,
        is_error: bool,
    },
    BargeInDetected {
        session_id: String,
    },
    AudioBackpressureDropped {
        session_id: String,
        queue_len: usize,
    },
    SweeperSwept {
        inspected: usize,
        force_closed: usize,
    },
    ShutdownStarted {
        open_sessions: usize,
    },
    ShutdownCompleted {
        forced_count: usize,
        duration_ms: u64,
    },
    ModelServiceConnected {
        session_id: String,
        region: String,
    },
    ModelServiceError {
        session_id: String,
        source: String,
        details: String,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "sg_event");
    }
}
