//! `WebSocket` handler for real-time reaction updates.
//!
//! Clients connect to `GET /ws/reactions` and receive a JSON-encoded
//! [`ReactionUpdate`] each time a toggle completes. Passing `?pid=<id>`
//! restricts the stream to one post.
//!
//! If a client falls behind, lagged messages are skipped and the client
//! resumes from the most recent update. Every update carries the full
//! sanitized counts, so a skipped message never leaves a client with
//! stale totals once the next one arrives.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use reactions_types::{ItemId, ReactionUpdate};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Query parameters accepted by `GET /ws/reactions`.
#[derive(Debug, Default, Deserialize)]
pub struct StreamFilter {
    /// Only forward updates for this post.
    pub pid: Option<String>,
}

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming reaction updates.
///
/// # Route
///
/// `GET /ws/reactions`
pub async fn ws_reactions(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(filter): Query<StreamFilter>,
) -> impl IntoResponse {
    let pid = filter.pid.map(ItemId::new).filter(|pid| !pid.is_empty());
    ws.on_upgrade(move |socket| handle_ws(socket, state, pid))
}

/// Whether a client filtered to `pid` should receive `update`.
fn wants(pid: Option<&ItemId>, update: &ReactionUpdate) -> bool {
    pid.is_none_or(|pid| *pid == update.item_id)
}

/// Subscribe to the broadcast channel and forward matching updates
/// as text frames until the client goes away.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, pid: Option<ItemId>) {
    debug!(pid = ?pid, "WebSocket client connected");

    let mut rx = state.subscribe();

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(update) => {
                        if !wants(pid.as_ref(), &update) {
                            continue;
                        }
                        let json = match serde_json::to_string(&update) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!("Failed to serialize reaction update: {e}");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    // The stream is one-way; client text and binary frames are ignored.
                    _ => {}
                }
            }
        }
    }
}
