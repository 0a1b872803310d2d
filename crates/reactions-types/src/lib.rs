//! Shared type definitions for the post reactions engine.
//!
//! This crate is the single source of truth for the identifiers, symbols
//! and read models used across the workspace. Wire types flow downstream
//! to `TypeScript` via `ts-rs` for the forum client.
//!
//! # Modules
//!
//! - [`ids`] -- Item and user identifiers (string or integer on the wire)
//! - [`symbol`] -- Reaction symbols, encoded key segments, storage slots
//! - [`state`] -- The two-state reactor machine and toggle outcomes
//! - [`views`] -- Counts views, toggle results, summaries, live updates

pub mod ids;
pub mod state;
pub mod symbol;
pub mod views;

// Re-export all public types at crate root for convenience.
pub use ids::{ItemId, RawId, UserId};
pub use state::{ReactorState, ToggleOutcome};
pub use symbol::{ReactionSlot, Symbol, SymbolKey};
pub use views::{CountsView, Reactable, ReactionSummary, ReactionUpdate, ToggleResult};
