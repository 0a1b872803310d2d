//! REST API endpoint handlers for the reactions server.
//!
//! The server is the transport collaborator of the engine: it resolves the
//! caller's identity, forwards to [`ReactionService`] and maps engine
//! errors to HTTP responses. Identity comes from the `X-User-Id` header,
//! which the authenticating proxy in front of this service sets. A missing
//! header, a blank value or `0` means a guest.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness probe |
//! | `GET` | `/api/reactions/allowed` | Allowed reactions in display order |
//! | `POST` | `/api/posts/{pid}/reactions/toggle` | Toggle the caller's reaction |
//! | `GET` | `/api/posts/{pid}/reactions` | Counts plus the caller's own reactions |
//! | `GET` | `/api/posts/{pid}/reactions/{emoji}/users` | Who reacted with `emoji` |
//!
//! [`ReactionService`]: reactions_core::ReactionService

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::response::IntoResponse;
use chrono::Utc;
use reactions_types::{CountsView, ItemId, ReactionUpdate, ReactorState, Symbol, UserId};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the authenticated user id.
pub const USER_HEADER: &str = "x-user-id";

// ---------------------------------------------------------------------------
// Extractors and payloads
// ---------------------------------------------------------------------------

/// The caller's identity, `None` for guests.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<UserId>);

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(UserId::new)
            .filter(|user| !user.is_empty() && user.as_str() != "0");
        Ok(Self(user))
    }
}

/// Body of `POST /api/posts/{pid}/reactions/toggle`.
#[derive(Debug, serde::Deserialize)]
pub struct ToggleRequest {
    /// The reaction to toggle.
    pub emoji: Symbol,
}

/// Response of `POST /api/posts/{pid}/reactions/toggle`.
#[derive(Debug, serde::Serialize)]
pub struct ToggleResponse {
    /// The toggled post.
    pub pid: ItemId,
    /// Sanitized counts after the toggle.
    pub counts: CountsView,
    /// The caller's state for the toggled reaction.
    pub state: ReactorState,
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness probe.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "store": state.service.store().name(),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/reactions/allowed
// ---------------------------------------------------------------------------

/// List the allowed reactions in display order.
pub async fn allowed(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "allowed": state.service.allowed_symbols(),
    }))
}

// ---------------------------------------------------------------------------
// POST /api/posts/{pid}/reactions/toggle
// ---------------------------------------------------------------------------

/// Toggle the caller's reaction on a post and broadcast the new counts.
pub async fn toggle(
    State(state): State<Arc<AppState>>,
    Path(pid): Path<String>,
    Viewer(viewer): Viewer,
    body: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let user = viewer.ok_or(ApiError::Unauthenticated)?;
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let item = ItemId::new(pid);

    let result = state.service.toggle(&item, &request.emoji, &user).await?;

    let receivers = state.broadcast(ReactionUpdate {
        item_id: result.item_id.clone(),
        symbol: result.symbol.clone(),
        user_id: user,
        state: result.state,
        counts: result.counts.clone(),
        at: Utc::now(),
    });
    info!(
        pid = %result.item_id,
        emoji = %result.symbol,
        state = ?result.state,
        receivers,
        "Reaction toggled"
    );

    Ok(Json(ToggleResponse {
        pid: result.item_id,
        counts: result.counts,
        state: result.state,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/posts/{pid}/reactions
// ---------------------------------------------------------------------------

/// Counts for a post plus the caller's own active reactions.
pub async fn get_reactions(
    State(state): State<Arc<AppState>>,
    Path(pid): Path<String>,
    Viewer(viewer): Viewer,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .service
        .summary(&ItemId::new(pid), viewer.as_ref())
        .await?;
    Ok(Json(summary))
}

// ---------------------------------------------------------------------------
// GET /api/posts/{pid}/reactions/{emoji}/users
// ---------------------------------------------------------------------------

/// Users reacting to a post with one emoji.
pub async fn get_reactors(
    State(state): State<Arc<AppState>>,
    Path((pid, emoji)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let item = ItemId::new(pid);
    let symbol = Symbol::new(emoji);
    let users = state.service.reactors(&item, &symbol).await?;

    Ok(Json(serde_json::json!({
        "pid": item,
        "emoji": symbol,
        "count": users.len(),
        "users": users,
    })))
}
