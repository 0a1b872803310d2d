//! Type-safe identifier wrappers for content items and users.
//!
//! Item and user identities are owned by the surrounding forum. The engine
//! only ever stores and compares them, so both are normalized to their
//! string form. On the wire either a JSON string (`"42"`) or a JSON integer
//! (`42`) is accepted; both decode to the same identifier.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Wire representation accepted for identifiers before normalization.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// A JSON string.
    Text(String),
    /// A JSON integer that fits in `i64`.
    Signed(i64),
    /// A JSON integer above `i64::MAX`.
    Unsigned(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

/// Generates a newtype wrapper around a normalized string identifier.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(from = "RawId")]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from anything string-like.
            ///
            /// Surrounding whitespace is trimmed. The result may be empty;
            /// emptiness is rejected by the service layer, not here.
            pub fn new(id: impl Into<String>) -> Self {
                let raw: String = id.into();
                let trimmed = raw.trim();
                if trimmed.len() == raw.len() {
                    Self(raw)
                } else {
                    Self(trimmed.to_owned())
                }
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is empty (i.e. missing).
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<RawId> for $name {
            fn from(raw: RawId) -> Self {
                Self::new(String::from(raw))
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self::new(id)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id.to_string())
            }
        }
    };
}

define_id! {
    /// Identifier of a reactable content item (a post).
    ItemId
}

define_id! {
    /// Identifier of the user reacting to an item.
    UserId
}
