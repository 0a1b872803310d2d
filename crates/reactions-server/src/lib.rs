//! HTTP and `WebSocket` transport for the post reactions engine.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **REST endpoints** to toggle a reaction, read a post's counts with
//!   the caller's own reactions, list reactors and list the allow-list
//! - **`WebSocket` endpoint** (`/ws/reactions`) that pushes every
//!   completed toggle via [`tokio::sync::broadcast`]
//!
//! # Architecture
//!
//! Handlers are thin: they resolve the caller from the `X-User-Id`
//! header, call [`ReactionService`](reactions_core::ReactionService)
//! and translate [`ReactionError`](reactions_core::ReactionError) into
//! status codes through [`ApiError`].

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use startup::{StartupError, build_state, load_config};
pub use state::AppState;
