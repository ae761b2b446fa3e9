//! `GET /api/tools` — lists the tools available to a session (§6).

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct ToolSummary {
    name: String,
    description: String,
}

#[derive(Serialize)]
struct ToolsResponse {
    tools: Vec<ToolSummary>,
}

pub async fn list_tools(State(state): State<AppState>) -> Json<ToolsResponse> {
    let tools = state
        .tool_registry
        .specs(None)
        .into_iter()
        .map(|spec| ToolSummary {
            name: spec.name,
            description: spec.description,
        })
        .collect();

    Json(ToolsResponse { tools })
}
