//! Process-wide shared state handed to every axum handler.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use sg_domain::config::Config;
use sg_domain::tool::ToolRegistry;
use sg_modelclient::ModelServiceConnection;
use sg_sessions::SessionStore;

// ── Core services ───────────────────────────────────────────────────
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
    pub tool_registry: Arc<ToolRegistry>,
    pub model_client: Arc<dyn ModelServiceConnection>,

    // ── Health reporting ─────────────────────────────────────────────
    /// Count of currently-open client sockets, tracked independently of
    /// `sessions` since a socket exists briefly before its `Session` is
    /// created and during its shutdown drain.
    pub socket_connections: Arc<AtomicI64>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        sessions: Arc<SessionStore>,
        tool_registry: Arc<ToolRegistry>,
        model_client: Arc<dyn ModelServiceConnection>,
    ) -> Self {
        Self {
            config,
            sessions,
            tool_registry,
            model_client,
            socket_connections: Arc::new(AtomicI64::new(0)),
            started_at: chrono::Utc::now(),
        }
    }

    pub fn socket_connected(&self) {
        self.socket_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn socket_disconnected(&self) {
        self.socket_connections.fetch_sub(1, Ordering::Relaxed);
    }
}
