//! `GET /health` — liveness and at-a-glance load for operators (§6).

use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    active_sessions: usize,
    socket_connections: i64,
    regions: Vec<String>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        active_sessions: state.sessions.len().await,
        socket_connections: state.socket_connections.load(Ordering::Relaxed),
        regions: vec![state.config.model_service.region.clone()],
    })
}
