//! Error taxonomy of the reaction engine.
//!
//! Validation and policy failures are detected before any storage access
//! and leave state untouched. Store failures are passed through unchanged;
//! the store's atomicity guarantees they left no partial write behind.

use reactions_db::DbError;

use crate::policy::PolicyError;

/// Errors returned by [`ReactionService`](crate::service::ReactionService).
#[derive(Debug, thiserror::Error)]
pub enum ReactionError {
    /// A required input was missing or blank.
    #[error("missing required field: {0}")]
    Validation(&'static str),

    /// The symbol is not in the allow-list.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// The backing store failed.
    #[error("store error: {0}")]
    Store(#[from] DbError),
}

impl ReactionError {
    /// Short machine-readable kind, for logs and protocol mapping.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Policy(_) => "policy",
            Self::Store(_) => "store",
        }
    }
}
