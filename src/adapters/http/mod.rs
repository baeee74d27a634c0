//! HTTP adapter - application router.
//!
//! Mounts the WebSocket endpoint under `/api/v1` next to a health check and
//! wraps everything in request tracing and CORS.

use axum::{extract::State, routing::get, Json, Router};
use http::HeaderValue;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::adapters::websocket::{websocket_router, WebSocketState};

/// Build the application router.
///
/// An empty `cors_origins` list allows any origin.
pub fn app_router(state: WebSocketState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", websocket_router())
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new())
                .on_response(DefaultOnResponse::new()),
        )
        .layer(cors_layer(cors_origins))
}

/// Health check with the current number of registered connections.
///
/// Route: `GET /health`
async fn health(State(state): State<WebSocketState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "connections": state.hub().connection_count(),
    }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
}
