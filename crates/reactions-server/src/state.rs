//! Shared application state for the reactions API server.
//!
//! [`AppState`] holds the [`ReactionService`] and the broadcast channel
//! that fans completed toggles out to `WebSocket` subscribers.

use reactions_core::ReactionService;
use reactions_types::ReactionUpdate;
use tokio::sync::broadcast;

/// Capacity of the broadcast channel for reaction updates.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 1024;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    /// The reaction engine.
    pub service: ReactionService,
    /// Broadcast sender for reaction updates.
    pub tx: broadcast::Sender<ReactionUpdate>,
}

impl AppState {
    /// Create application state around `service`.
    pub fn new(service: ReactionService) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { service, tx }
    }

    /// Subscribe to the reaction update channel.
    pub fn subscribe(&self) -> broadcast::Receiver<ReactionUpdate> {
        self.tx.subscribe()
    }

    /// Publish a reaction update to all connected clients.
    ///
    /// Returns the number of receivers that received the message.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, update: ReactionUpdate) -> usize {
        // send returns Err only when there are zero receivers,
        // which is normal when no WebSocket clients are connected.
        self.tx.send(update).unwrap_or(0)
    }
}
