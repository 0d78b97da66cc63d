use crate::signaling::{RelayService, ws_handler};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};

/// HTTP surface: readiness probe at `/`, WebSocket upgrade at `/ws`.
pub fn app(service: RelayService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(status))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(service)
}

async fn status() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "WebRTC signaling server running",
    }))
}
