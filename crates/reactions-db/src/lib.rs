//! Storage layer for the post reactions engine.
//!
//! Two backends implement the same atomic slot contract:
//!
//! ```text
//! ReactionService
//!     |
//!     +-- ReactionStore::Memory    --> per-slot tokio Mutex
//!     |
//!     +-- ReactionStore::Dragonfly --> Lua scripts (EVAL)
//!         |-- post:{item}:reactions            (hash: symbol -> count)
//!         +-- post:{item}:reaction:{symbol}    (set: user ids)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- [`ReactionStore`] enum dispatch over the backends
//! - [`memory`] -- In-process backend
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) backend
//! - [`error`] -- Shared error types

pub mod dragonfly;
pub mod error;
pub mod memory;
pub mod store;

// Re-export primary types for convenience.
pub use dragonfly::DragonflyStore;
pub use error::DbError;
pub use memory::MemoryStore;
pub use store::ReactionStore;
