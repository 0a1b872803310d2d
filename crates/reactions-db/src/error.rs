//! Error types for the storage layer.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`fred`] errors with additional context about which operation failed.
//! The in-memory backend never fails, so every variant originates from the
//! Dragonfly backend or its configuration.

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A stored value or script reply had an unexpected shape.
    #[error("Malformed reply for {key}: {message}")]
    Malformed {
        /// The key being read.
        key: String,
        /// What was wrong with the reply.
        message: String,
    },

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
