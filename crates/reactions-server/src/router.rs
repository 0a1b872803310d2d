//! Axum router construction for the reactions API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin forum clients.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the reactions server.
///
/// The router includes:
/// - `GET /health` -- liveness probe
/// - `GET /ws/reactions` -- `WebSocket` reaction update stream
/// - `GET /api/reactions/allowed` -- allow-list in display order
/// - `POST /api/posts/{pid}/reactions/toggle` -- toggle the caller's reaction
/// - `GET /api/posts/{pid}/reactions` -- counts plus the caller's reactions
/// - `GET /api/posts/{pid}/reactions/{emoji}/users` -- reactors for one emoji
///
/// CORS allows any origin; the `X-User-Id` header is expected to be set
/// by a trusted proxy, not by browsers.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // WebSocket
        .route("/ws/reactions", get(ws::ws_reactions))
        // REST API
        .route("/api/reactions/allowed", get(handlers::allowed))
        .route("/api/posts/{pid}/reactions", get(handlers::get_reactions))
        .route("/api/posts/{pid}/reactions/toggle", post(handlers::toggle))
        .route(
            "/api/posts/{pid}/reactions/{emoji}/users",
            get(handlers::get_reactors),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
