pub mod health;
pub mod socket;
pub mod tools;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the CORS layer from `server.cors.allowed_origins`, matching
/// `host:*`-style port wildcards as well as an exact-origin allowlist.
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(AllowOrigin::any())
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(tower_http::cors::Any);
    }

    let patterns: Vec<String> = allowed_origins.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            let Ok(origin) = origin.to_str() else {
                return false;
            };
            patterns.iter().any(|pattern| origin_matches(pattern, origin))
        }))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}

fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.strip_suffix(":*") {
        Some(prefix) => origin
            .rsplit_once(':')
            .map(|(host, _port)| host == prefix)
            .unwrap_or(false),
        None => pattern == origin,
    }
}

pub fn router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors.allowed_origins);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/tools", get(tools::list_tools))
        .route("/ws", get(socket::upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
