//! Reaction toggle and aggregation engine.
//!
//! This crate owns the rules of the reactions subsystem: which symbols may
//! be used, how a toggle is performed and what collaborators get back.
//! Storage lives in `reactions-db`; transport lives in `reactions-server`.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration (`reactions-config.yaml`)
//! - [`policy`] -- [`EmojiPolicy`]: allow-list and key encoding
//! - [`service`] -- [`ReactionService`]: toggle, attach, counts, reactors, purge
//! - [`error`] -- [`ReactionError`] taxonomy

pub mod config;
pub mod error;
pub mod policy;
pub mod service;

pub use config::{ConfigError, ReactionsConfig, StoreBackend};
pub use error::ReactionError;
pub use policy::{EmojiPolicy, PolicyError};
pub use reactions_types::ReactorState;
pub use service::ReactionService;
