//! Per (item, symbol, user) reactor state machine.
//!
//! A user either reacts with a symbol on an item or does not. A toggle
//! always moves to the other state:
//!
//! ```text
//! Inactive --toggle--> Active --toggle--> Inactive ...
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Whether a user is currently reacting with a symbol on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ReactorState {
    /// The user is not in the membership set.
    Inactive,
    /// The user is in the membership set.
    Active,
}

impl ReactorState {
    /// State implied by current set membership.
    pub const fn from_membership(is_member: bool) -> Self {
        if is_member { Self::Active } else { Self::Inactive }
    }

    /// The state a toggle moves to.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Inactive => Self::Active,
            Self::Active => Self::Inactive,
        }
    }

    /// Whether this is [`ReactorState::Active`].
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Result of one atomic toggle against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// The reactor's state after the toggle.
    pub state: ReactorState,
    /// The slot's counter after the toggle.
    pub count: i64,
}
